//! Response side of the editor handshake.
//!
//! The editor writes `build_result.json` exactly once per request. The poller
//! deletes it on first sight so a later cycle can never pick up a stale
//! result.

use crate::error::{BuildError, Result};
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_INTERVAL_SECS: f64 = 2.0;

/// Payload of `build_result.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_seconds: f64,
}

impl BuildResult {
    /// Error text reported by the editor, if it reported anything useful.
    pub fn error_message(&self) -> &str {
        match self.error.as_deref() {
            Some(msg) if !msg.trim().is_empty() => msg,
            _ => "Unknown error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            interval: Duration::from_secs_f64(DEFAULT_INTERVAL_SECS),
        }
    }
}

/// Block until the editor's result file appears in `project`, then consume it.
///
/// Checks every `opts.interval` until `opts.timeout` has elapsed. The file is
/// removed before this returns, including when its contents fail to parse.
pub fn poll_result(project: &Path, opts: PollOptions) -> Result<BuildResult> {
    let path = paths::result_path(project);
    let start = Instant::now();
    tracing::debug!(
        path = %path.display(),
        timeout_secs = opts.timeout.as_secs_f64(),
        interval_secs = opts.interval.as_secs_f64(),
        "polling for build result"
    );

    loop {
        if let Some(result) = take_result(&path)? {
            tracing::info!(
                success = result.success,
                duration_secs = result.duration_seconds,
                waited_secs = start.elapsed().as_secs_f64(),
                "received build result"
            );
            return Ok(result);
        }

        let elapsed = start.elapsed();
        if elapsed >= opts.timeout {
            return Err(BuildError::Timeout {
                path,
                timeout_secs: opts.timeout.as_secs_f64(),
            });
        }
        std::thread::sleep(opts.interval.min(opts.timeout - elapsed));
    }
}

/// Read and delete the result file if it exists.
fn take_result(path: &Path) -> Result<Option<BuildResult>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    io::remove_if_present(path)?;

    serde_json::from_str(&data)
        .map(Some)
        .map_err(|source| BuildError::MalformedResult {
            path: path.to_path_buf(),
            source,
        })
}
