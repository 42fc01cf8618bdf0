use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("configuration file not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("required config field missing: {0}")]
    ConfigFieldMissing(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unity project not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("output folder not found: {}", .0.display())]
    OutputFolderNotFound(PathBuf),

    #[error("invalid build mode '{0}': must be one of auto, batchmode, trigger")]
    InvalidMode(String),

    #[error("invalid increment type '{0}': must be one of major, minor, patch")]
    InvalidIncrement(String),

    #[error("invalid version format '{0}': expected X.Y.Z")]
    InvalidVersion(String),

    #[error("cannot apply {increment} increment to version {version}: component out of range")]
    VersionOverflow { version: String, increment: String },

    #[error("Unity editors directory not found: {}", .0.display())]
    EditorsDirNotFound(PathBuf),

    #[error("Unity executable not found: {}{}", .path.display(), available_hint(.available))]
    UnityNotFound {
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("could not find a Unity editors folder on any searched drive")]
    EditorsNotDiscovered,

    #[error(
        "Unity project is locked: close the Unity editor before building.\nLock file: {}",
        .0.display()
    )]
    ProjectLocked(PathBuf),

    #[error(
        "trigger mode requires the Unity editor to be running, but no lock file was found.\nExpected: {}",
        .0.display()
    )]
    EditorNotRunning(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bundled editor script missing: {0}")]
    AssetMissing(String),

    #[error("build result not received within {timeout_secs} seconds. Expected: {}", .path.display())]
    Timeout { path: PathBuf, timeout_secs: f64 },

    #[error("malformed build result {}: {source}", .path.display())]
    MalformedResult {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("build failed after {duration_seconds:.1}s: {message}")]
    EditorBuildFailed {
        message: String,
        duration_seconds: f64,
    },

    #[error("Unity build failed with exit code {code}. Check log: {}", .log.display())]
    BuildFailed { code: i32, log: PathBuf },

    #[error("Unity build timed out after {0} seconds")]
    BatchmodeTimeout(u64),

    #[error("build completed but APK not found: {}", .0.display())]
    ApkNotFound(PathBuf),

    #[error("failed to launch Unity: {0}")]
    Spawn(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!("\nAvailable versions: {}", available.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
