use crate::output::{print_fields, print_json};
use anyhow::Context;
use std::path::Path;
use unity_build_core::{config::BuildConfig, lock, paths, strategy::select_strategy};

pub fn run(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = BuildConfig::load(config_path).context("failed to load config")?;
    let editor_running = lock::is_editor_running(&config.project_path);
    let strategy = select_strategy(config.build_mode, editor_running);

    if json {
        let value = serde_json::json!({
            "project": config.project_path,
            "editor_running": editor_running,
            "lock_file": paths::lock_path(&config.project_path),
            "build_mode": config.build_mode,
            "strategy": strategy,
        });
        return print_json(&value);
    }

    print_fields(&[
        ("Project", config.project_path.display().to_string()),
        (
            "Editor",
            if editor_running { "running" } else { "closed" }.to_string(),
        ),
        ("Mode", config.build_mode.to_string()),
        ("Strategy", strategy.to_string()),
    ]);
    Ok(())
}
