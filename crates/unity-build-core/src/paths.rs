use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Project-relative locations
// ---------------------------------------------------------------------------

pub const LOCK_FILE: &str = "Temp/UnityLockfile";
pub const EDITOR_SCRIPTS_DIR: &str = "Assets/Editor";

pub const TRIGGER_FILE: &str = "build_trigger.json";
pub const RESULT_FILE: &str = "build_result.json";

pub const WATCHER_SCRIPT: &str = "BuildTriggerWatcher.cs";
pub const BUILD_SCRIPT: &str = "BuildScript.cs";

// ---------------------------------------------------------------------------
// Editor installation layout
// ---------------------------------------------------------------------------

pub const HUB_EDITOR_SUBPATH: &str = "Unity/Hub/Editor";
pub const EDITORS_CACHE_FILE: &str = "unity_editors_cache.json";

#[cfg(target_os = "windows")]
pub const UNITY_EXE: &str = "Editor/Unity.exe";
#[cfg(target_os = "macos")]
pub const UNITY_EXE: &str = "Unity.app/Contents/MacOS/Unity";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const UNITY_EXE: &str = "Editor/Unity";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn lock_path(project: &Path) -> PathBuf {
    project.join(LOCK_FILE)
}

pub fn trigger_path(project: &Path) -> PathBuf {
    project.join(TRIGGER_FILE)
}

pub fn result_path(project: &Path) -> PathBuf {
    project.join(RESULT_FILE)
}

pub fn editor_scripts_dir(project: &Path) -> PathBuf {
    project.join(EDITOR_SCRIPTS_DIR)
}

/// The sidecar Unity generates next to every imported asset.
pub fn meta_path(asset: &Path) -> PathBuf {
    let mut name = asset.as_os_str().to_owned();
    name.push(".meta");
    PathBuf::from(name)
}

pub fn unity_executable(editors: &Path, unity_version: &str) -> PathBuf {
    editors.join(unity_version).join(UNITY_EXE)
}

/// Editors cache lives next to the config file it belongs to.
pub fn editors_cache_path(config_file: &Path) -> PathBuf {
    config_file
        .parent()
        .unwrap_or(Path::new("."))
        .join(EDITORS_CACHE_FILE)
}
