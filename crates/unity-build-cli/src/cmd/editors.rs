use crate::output::{print_fields, print_json};
use anyhow::Context;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use unity_build_core::{config::BuildConfig, discovery, paths, BuildError};

pub fn run(config_path: &Path, rescan: bool, json: bool) -> anyhow::Result<()> {
    let config = BuildConfig::load(config_path).context("failed to load config")?;
    let editors = if rescan {
        discover_and_cache(config_path)?
    } else {
        resolve_editors_path(config_path, &config)?
    };
    let versions = installed_versions(&editors);

    if json {
        let value = serde_json::json!({
            "unity_editors_path": editors,
            "versions": versions,
            "configured_version": config.unity_version,
        });
        return print_json(&value);
    }

    print_fields(&[
        ("Editors", editors.display().to_string()),
        ("Installed", versions.join(", ")),
        ("Configured", config.unity_version.clone()),
    ]);
    Ok(())
}

/// Editors folder from the config, else the cache, else an interactive scan.
pub fn resolve_editors_path(config_path: &Path, config: &BuildConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = &config.unity_editors_path {
        return Ok(path.clone());
    }
    let cache = paths::editors_cache_path(config_path);
    if let Some(cached) = discovery::load_editors_cache(&cache) {
        println!("Using cached Unity editors path: {}", cached.display());
        return Ok(cached);
    }
    discover_and_cache(config_path)
}

fn discover_and_cache(config_path: &Path) -> anyhow::Result<PathBuf> {
    let stdin = std::io::stdin();
    let found = prompt_and_discover(stdin.lock(), std::io::stdout())?;
    discovery::save_editors_cache(&paths::editors_cache_path(config_path), &found);
    Ok(found)
}

/// Ask for drives to scan until an editors folder turns up or the user
/// gives up. End of input counts as giving up.
pub fn prompt_and_discover<R: BufRead, W: Write>(
    mut input: R,
    mut out: W,
) -> anyhow::Result<PathBuf> {
    loop {
        write!(out, "Enter drive letter (or folder) to search for Unity editors (e.g. C): ")?;
        out.flush()?;
        let Some(answer) = read_answer(&mut input)? else {
            return Err(BuildError::EditorsNotDiscovered.into());
        };
        if answer.is_empty() {
            continue;
        }

        let root = discovery::drive_root(&answer);
        writeln!(out, "Searching {} for Unity editors ...", root.display())?;
        if let Some(found) = discovery::search_drive(&root) {
            writeln!(out, "Found Unity editors at: {}", found.display())?;
            return Ok(found);
        }

        write!(
            out,
            "Unity not found on {}. Search another drive? (y/n): ",
            root.display()
        )?;
        out.flush()?;
        let again = read_answer(&mut input)?.unwrap_or_default();
        if !again.eq_ignore_ascii_case("y") {
            return Err(BuildError::EditorsNotDiscovered.into());
        }
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn installed_versions(editors: &Path) -> Vec<String> {
    let mut versions: Vec<String> = std::fs::read_dir(editors)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .filter_map(|e| e.file_name().to_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    versions.sort();
    versions
}
