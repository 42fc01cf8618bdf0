use crate::error::{BuildError, Result};
use crate::poll::{PollOptions, DEFAULT_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS};
use crate::types::{BuildMode, IncrementKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Keys that must be present in the config file. `unity_editors_path` may be
/// `null` to request discovery, but the key itself is still required.
pub const REQUIRED_FIELDS: &[&str] = &[
    "unity_version",
    "unity_editors_path",
    "project_path",
    "scenes",
    "build_target",
    "output_folder",
    "apk_prefix",
    "version_increment",
    "build_script_method",
    "log_folder",
];

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// BuildConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub unity_version: String,
    pub unity_editors_path: Option<PathBuf>,
    pub project_path: PathBuf,
    pub scenes: Vec<String>,
    pub build_target: String,
    pub output_folder: PathBuf,
    pub apk_prefix: String,
    pub version_increment: IncrementKind,
    pub build_script_method: String,
    pub log_folder: PathBuf,
    #[serde(default)]
    pub build_mode: BuildMode,
    #[serde(default = "default_trigger_timeout")]
    pub trigger_timeout_seconds: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,
    #[serde(default = "default_batchmode_timeout")]
    pub batchmode_timeout_seconds: u64,
}

fn default_trigger_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval() -> f64 {
    DEFAULT_INTERVAL_SECS
}

fn default_batchmode_timeout() -> u64 {
    3600
}

impl BuildConfig {
    /// Load and check the config file at `path`.
    ///
    /// Fails when the file or a required key is missing, or when the project
    /// or output folder does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BuildError::ConfigMissing(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&data)?;
        let obj = value
            .as_object()
            .ok_or_else(|| BuildError::InvalidConfig("top level must be a JSON object".into()))?;

        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !obj.contains_key(**f)) {
            return Err(BuildError::ConfigFieldMissing(missing.to_string()));
        }

        let cfg: BuildConfig = serde_json::from_value(value)
            .map_err(|e| BuildError::InvalidConfig(e.to_string()))?;

        if !cfg.project_path.exists() {
            return Err(BuildError::ProjectNotFound(cfg.project_path));
        }
        if !cfg.output_folder.exists() {
            return Err(BuildError::OutputFolderNotFound(cfg.output_folder));
        }
        tracing::debug!(path = %path.display(), project = %cfg.project_path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            timeout: Duration::from_secs(self.trigger_timeout_seconds),
            interval: Duration::try_from_secs_f64(self.poll_interval_seconds)
                .unwrap_or(Duration::from_secs_f64(DEFAULT_INTERVAL_SECS)),
        }
    }

    pub fn batchmode_timeout(&self) -> Duration {
        Duration::from_secs(self.batchmode_timeout_seconds)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.scenes.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "scenes is empty: at least one scene is required".to_string(),
            });
        }
        for scene in &self.scenes {
            if !scene.ends_with(".unity") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("scene '{scene}' does not end in .unity"),
                });
            }
        }

        if self.poll_interval_seconds.is_nan() || self.poll_interval_seconds <= 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "poll_interval_seconds must be greater than zero".to_string(),
            });
        } else if self.poll_interval_seconds > self.trigger_timeout_seconds as f64 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "poll_interval_seconds ({}) exceeds trigger_timeout_seconds ({}); \
                     the result file will be checked only at the deadline",
                    self.poll_interval_seconds, self.trigger_timeout_seconds
                ),
            });
        }

        if self.apk_prefix.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "apk_prefix is empty".to_string(),
            });
        }

        if self.build_script_method.split('.').count() < 2 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "build_script_method '{}' should be a fully qualified Class.Method",
                    self.build_script_method
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_json(dir: &Path) -> serde_json::Value {
        let project = dir.join("project");
        let output = dir.join("output");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::create_dir_all(&output).unwrap();
        serde_json::json!({
            "unity_version": "6000.3.7f1",
            "unity_editors_path": dir,
            "project_path": project,
            "scenes": ["Assets/Scenes/Main.unity"],
            "build_target": "Android",
            "output_folder": output,
            "apk_prefix": "test-app",
            "version_increment": "patch",
            "build_script_method": "BuildAutomation.BuildScript.BuildAndroid",
            "log_folder": "logs",
        })
    }

    fn write(dir: &Path, value: &serde_json::Value) -> PathBuf {
        let path = dir.join("config.json");
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn load_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), &valid_json(dir.path()));
        let cfg = BuildConfig::load(&path).unwrap();

        assert_eq!(cfg.unity_version, "6000.3.7f1");
        assert_eq!(cfg.build_target, "Android");
        assert_eq!(cfg.scenes, vec!["Assets/Scenes/Main.unity"]);
        assert_eq!(cfg.apk_prefix, "test-app");
        assert_eq!(cfg.version_increment, IncrementKind::Patch);
        assert_eq!(cfg.build_mode, BuildMode::Auto);
        assert_eq!(cfg.trigger_timeout_seconds, 3600);
        assert_eq!(cfg.poll_interval_seconds, 2.0);
    }

    #[test]
    fn missing_file() {
        let dir = TempDir::new().unwrap();
        let err = BuildConfig::load(&dir.path().join("nonexistent.json")).unwrap_err();
        assert!(err.to_string().contains("configuration file not found"));
    }

    #[test]
    fn missing_field_is_named() {
        let dir = TempDir::new().unwrap();
        let mut value = valid_json(dir.path());
        value.as_object_mut().unwrap().remove("unity_version");
        let err = BuildConfig::load(&write(dir.path(), &value)).unwrap_err();
        assert_eq!(err.to_string(), "required config field missing: unity_version");
    }

    #[test]
    fn null_editors_path_requests_discovery() {
        let dir = TempDir::new().unwrap();
        let mut value = valid_json(dir.path());
        value["unity_editors_path"] = serde_json::Value::Null;
        let cfg = BuildConfig::load(&write(dir.path(), &value)).unwrap();
        assert!(cfg.unity_editors_path.is_none());
    }

    #[test]
    fn missing_project_path() {
        let dir = TempDir::new().unwrap();
        let mut value = valid_json(dir.path());
        value["project_path"] = serde_json::json!(dir.path().join("nonexistent_project"));
        let err = BuildConfig::load(&write(dir.path(), &value)).unwrap_err();
        assert!(err.to_string().contains("Unity project not found"));
    }

    #[test]
    fn missing_output_folder() {
        let dir = TempDir::new().unwrap();
        let mut value = valid_json(dir.path());
        value["output_folder"] = serde_json::json!(dir.path().join("nonexistent_output"));
        let err = BuildConfig::load(&write(dir.path(), &value)).unwrap_err();
        assert!(err.to_string().contains("output folder not found"));
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut value = valid_json(dir.path());
        value["build_mode"] = serde_json::json!("sometimes");
        let err = BuildConfig::load(&write(dir.path(), &value)).unwrap_err();
        assert!(matches!(err, BuildError::InvalidConfig(_)));
    }

    #[test]
    fn optional_tuning_overrides() {
        let dir = TempDir::new().unwrap();
        let mut value = valid_json(dir.path());
        value["build_mode"] = serde_json::json!("trigger");
        value["trigger_timeout_seconds"] = serde_json::json!(60);
        value["poll_interval_seconds"] = serde_json::json!(0.5);
        let cfg = BuildConfig::load(&write(dir.path(), &value)).unwrap();

        assert_eq!(cfg.build_mode, BuildMode::Trigger);
        let opts = cfg.poll_options();
        assert_eq!(opts.timeout, Duration::from_secs(60));
        assert_eq!(opts.interval, Duration::from_millis(500));
    }

    #[test]
    fn validate_valid_config_no_warnings() {
        let dir = TempDir::new().unwrap();
        let cfg = BuildConfig::load(&write(dir.path(), &valid_json(dir.path()))).unwrap();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_flags_empty_scenes_and_zero_interval() {
        let dir = TempDir::new().unwrap();
        let mut cfg = BuildConfig::load(&write(dir.path(), &valid_json(dir.path()))).unwrap();
        cfg.scenes.clear();
        cfg.poll_interval_seconds = 0.0;

        let warnings = cfg.validate();
        let errors: Vec<_> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .collect();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn validate_warns_on_odd_scene_and_long_interval() {
        let dir = TempDir::new().unwrap();
        let mut cfg = BuildConfig::load(&write(dir.path(), &valid_json(dir.path()))).unwrap();
        cfg.scenes.push("Assets/Scenes/Menu".to_string());
        cfg.trigger_timeout_seconds = 1;
        cfg.poll_interval_seconds = 5.0;

        let warnings = cfg.validate();
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Warning));
        assert!(warnings.iter().any(|w| w.message.contains("does not end in .unity")));
        assert!(warnings.iter().any(|w| w.message.contains("exceeds trigger_timeout_seconds")));
    }
}
