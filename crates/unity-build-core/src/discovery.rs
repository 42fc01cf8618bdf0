//! Locating Unity editor installations.
//!
//! Unity Hub installs every editor version as `<editors>/<version>/...`.
//! When the config does not name the editors folder, drives are scanned for
//! the Hub layout and the first hit is cached beside the config file.

use crate::error::{BuildError, Result};
use crate::{io, paths};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static VERSION_DIR_RE: OnceLock<Regex> = OnceLock::new();

fn version_dir_re() -> &'static Regex {
    VERSION_DIR_RE.get_or_init(|| Regex::new(r"^\d{4}\.\d+\.\d+[a-z]\d+$").unwrap())
}

/// Path of the editor binary for `unity_version` inside `editors`.
///
/// When the binary is missing the error lists the versions that are
/// installed, sorted.
pub fn find_unity_executable(editors: &Path, unity_version: &str) -> Result<PathBuf> {
    if !editors.is_dir() {
        return Err(BuildError::EditorsDirNotFound(editors.to_path_buf()));
    }
    let exe = paths::unity_executable(editors, unity_version);
    if exe.is_file() {
        return Ok(exe);
    }

    let mut available: Vec<String> = std::fs::read_dir(editors)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    available.sort();
    Err(BuildError::UnityNotFound {
        path: exe,
        available,
    })
}

/// True if `path` holds at least one versioned editor with its binary.
pub fn is_valid_editors_dir(path: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(path) else {
        return false;
    };
    entries.filter_map(|e| e.ok()).any(|entry| {
        let name = entry.file_name();
        let versioned = name.to_str().is_some_and(|n| version_dir_re().is_match(n));
        versioned && entry.path().join(paths::UNITY_EXE).is_file()
    })
}

fn read_dirs(path: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(path) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable directory");
            Vec::new()
        }
    }
}

/// Search one drive (or any root directory) for a Unity Hub editors folder.
///
/// The standard install locations are tried first, then every directory one
/// and two levels below `root`.
pub fn search_drive(root: &Path) -> Option<PathBuf> {
    let candidates = [
        root.join("Program Files").join(paths::HUB_EDITOR_SUBPATH),
        root.join("Program Files (x86)").join(paths::HUB_EDITOR_SUBPATH),
        root.join(paths::HUB_EDITOR_SUBPATH),
    ];
    for candidate in candidates {
        tracing::info!(path = %candidate.display(), "checking");
        if is_valid_editors_dir(&candidate) {
            return Some(candidate);
        }
    }

    tracing::info!(root = %root.display(), "scanning top-level directories");
    for top in read_dirs(root) {
        let deep = top.join(paths::HUB_EDITOR_SUBPATH);
        if is_valid_editors_dir(&deep) {
            return Some(deep);
        }
        for sub in read_dirs(&top) {
            let deep = sub.join(paths::HUB_EDITOR_SUBPATH);
            if is_valid_editors_dir(&deep) {
                return Some(deep);
            }
        }
    }
    None
}

/// Turn what the user typed at the drive prompt into a root to scan.
/// A single letter means that Windows drive; anything else is a path.
pub fn drive_root(input: &str) -> PathBuf {
    let input = input.trim().trim_end_matches(':');
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => {
            PathBuf::from(format!("{}:/", letter.to_ascii_uppercase()))
        }
        _ => PathBuf::from(input),
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorsCache {
    pub unity_editors_path: PathBuf,
    pub found_at: DateTime<Utc>,
}

/// Load the cached editors folder. A missing, unreadable or stale cache
/// yields `None`.
pub fn load_editors_cache(cache: &Path) -> Option<PathBuf> {
    let data = std::fs::read_to_string(cache).ok()?;
    let parsed: EditorsCache = match serde_json::from_str(&data) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(path = %cache.display(), error = %e, "ignoring unreadable editors cache");
            return None;
        }
    };
    if !is_valid_editors_dir(&parsed.unity_editors_path) {
        tracing::debug!(path = %parsed.unity_editors_path.display(), "cached editors folder is stale");
        return None;
    }
    Some(parsed.unity_editors_path)
}

/// Persist the discovered editors folder. Failure only costs a rescan next
/// time, so it is logged, not returned.
pub fn save_editors_cache(cache: &Path, editors: &Path) {
    let entry = EditorsCache {
        unity_editors_path: editors.to_path_buf(),
        found_at: Utc::now(),
    };
    let written = serde_json::to_string_pretty(&entry)
        .map_err(BuildError::from)
        .and_then(|data| io::atomic_write(cache, data.as_bytes()));
    if let Err(e) = written {
        tracing::warn!(path = %cache.display(), error = %e, "failed to save editors cache");
    }
}
