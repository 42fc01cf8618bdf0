use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// BuildMode
// ---------------------------------------------------------------------------

/// Requested strategy preference, from the CLI or `build_mode` in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    #[default]
    Auto,
    Batchmode,
    Trigger,
}

impl BuildMode {
    pub fn all() -> &'static [BuildMode] {
        &[BuildMode::Auto, BuildMode::Batchmode, BuildMode::Trigger]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Auto => "auto",
            BuildMode::Batchmode => "batchmode",
            BuildMode::Trigger => "trigger",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BuildMode {
    type Err = crate::error::BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(BuildMode::Auto),
            "batchmode" => Ok(BuildMode::Batchmode),
            "trigger" => Ok(BuildMode::Trigger),
            _ => Err(crate::error::BuildError::InvalidMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// BuildStrategy
// ---------------------------------------------------------------------------

/// The strategy actually run. Derived per invocation, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStrategy {
    Batchmode,
    Trigger,
}

impl BuildStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStrategy::Batchmode => "batchmode",
            BuildStrategy::Trigger => "trigger",
        }
    }
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IncrementKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementKind {
    Major,
    Minor,
    Patch,
}

impl IncrementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IncrementKind::Major => "major",
            IncrementKind::Minor => "minor",
            IncrementKind::Patch => "patch",
        }
    }
}

impl fmt::Display for IncrementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IncrementKind {
    type Err = crate::error::BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(IncrementKind::Major),
            "minor" => Ok(IncrementKind::Minor),
            "patch" => Ok(IncrementKind::Patch),
            _ => Err(crate::error::BuildError::InvalidIncrement(s.to_string())),
        }
    }
}
