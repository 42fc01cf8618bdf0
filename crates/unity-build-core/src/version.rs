use crate::error::{BuildError, Result};
use crate::types::IncrementKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Version used when the output folder holds no earlier build.
pub const INITIAL_VERSION: Version = Version::new(0, 1, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Next version for `kind`. Fails if the bumped component would overflow.
    pub fn increment(self, kind: IncrementKind) -> Result<Self> {
        let bump = |n: u32| {
            n.checked_add(1).ok_or_else(|| BuildError::VersionOverflow {
                version: self.to_string(),
                increment: kind.to_string(),
            })
        };
        Ok(match kind {
            IncrementKind::Patch => Self::new(self.major, self.minor, bump(self.patch)?),
            IncrementKind::Minor => Self::new(self.major, bump(self.minor)?, 0),
            IncrementKind::Major => Self::new(bump(self.major)?, 0, 0),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for Version {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BuildError::InvalidVersion(s.to_string());
        let parts: Vec<&str> = s.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(invalid());
        };
        Ok(Self::new(
            major.parse().map_err(|_| invalid())?,
            minor.parse().map_err(|_| invalid())?,
            patch.parse().map_err(|_| invalid())?,
        ))
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

impl TryFrom<String> for Version {
    type Error = BuildError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// `<prefix>_v<X.Y.Z>.apk`
pub fn apk_file_name(prefix: &str, version: Version) -> String {
    format!("{prefix}_v{version}.apk")
}

fn apk_pattern(prefix: &str) -> Regex {
    let pattern = format!(r"^{}_v(\d+)\.(\d+)\.(\d+)\.apk$", regex::escape(prefix));
    // The prefix is escaped, so the pattern is always valid.
    Regex::new(&pattern).expect("escaped apk pattern compiles")
}

/// Highest version among `<prefix>_vX.Y.Z.apk` files in `folder`, if any.
pub fn detect_latest_version(folder: &Path, prefix: &str) -> Result<Option<Version>> {
    if !folder.is_dir() {
        return Ok(None);
    }
    let re = apk_pattern(prefix);
    let mut latest = None;
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(caps) = name.to_str().and_then(|n| re.captures(n)) else {
            continue;
        };
        let parsed = (caps[1].parse(), caps[2].parse(), caps[3].parse());
        if let (Ok(major), Ok(minor), Ok(patch)) = parsed {
            latest = latest.max(Some(Version::new(major, minor, patch)));
        }
    }
    Ok(latest)
}

/// Pick the version to build: `explicit` when given, otherwise the latest
/// build in `folder` bumped by `kind`, otherwise [`INITIAL_VERSION`].
pub fn resolve_version(
    explicit: Option<&str>,
    kind: IncrementKind,
    folder: &Path,
    prefix: &str,
) -> Result<Version> {
    if let Some(v) = explicit {
        return v.parse();
    }
    match detect_latest_version(folder, prefix)? {
        Some(latest) => {
            let next = latest.increment(kind)?;
            tracing::info!(%latest, %next, increment = %kind, "incrementing version");
            Ok(next)
        }
        None => {
            tracing::info!(version = %INITIAL_VERSION, "no existing builds found");
            Ok(INITIAL_VERSION)
        }
    }
}
