//! One trigger-mode build, end to end.
//!
//! preflight → clear stale result → deploy watcher → write trigger → poll → cleanup → report.
//! Nothing is retried. The watcher is removed on every path out of
//! [`run_trigger_cycle`], including panics.

use crate::error::{BuildError, Result};
use crate::poll::{poll_result, PollOptions};
use crate::{deploy, io, lock, paths, trigger};
use serde::Serialize;
use std::path::Path;

/// Everything the editor needs to know for one trigger-mode build.
#[derive(Debug, Clone)]
pub struct TriggerJob<'a> {
    pub project: &'a Path,
    pub output_path: &'a Path,
    pub scenes: &'a [String],
    pub build_target: &'a str,
    pub poll: PollOptions,
}

/// A build the editor reported as successful.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerOutcome {
    pub duration_seconds: f64,
}

/// Hand the build to the running editor and wait for its answer.
///
/// Errors are terminal:
/// - [`BuildError::EditorNotRunning`] before anything is written;
/// - [`BuildError::Timeout`] when the editor never answered;
/// - [`BuildError::EditorBuildFailed`] when it answered with a failure.
pub fn run_trigger_cycle(job: &TriggerJob<'_>) -> Result<TriggerOutcome> {
    if !lock::is_editor_running(job.project) {
        return Err(BuildError::EditorNotRunning(paths::lock_path(job.project)));
    }

    // An answer to an earlier, abandoned request must not answer this one.
    let stale = paths::result_path(job.project);
    if io::remove_if_present(&stale)? {
        tracing::debug!(path = %stale.display(), "removed stale build result");
    }

    let watcher = deploy::deploy_watcher(job.project)?;
    let polled = write_and_wait(job);
    let cleaned = watcher.cleanup();

    let result = match (polled, cleaned) {
        (Ok(result), Ok(())) => result,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), cleaned) => {
            if let Err(cleanup_err) = cleaned {
                tracing::warn!(error = %cleanup_err, "watcher cleanup failed after a failed cycle");
            }
            return Err(e);
        }
    };

    if !result.success {
        return Err(BuildError::EditorBuildFailed {
            message: result.error_message().to_string(),
            duration_seconds: result.duration_seconds,
        });
    }
    Ok(TriggerOutcome {
        duration_seconds: result.duration_seconds,
    })
}

fn write_and_wait(job: &TriggerJob<'_>) -> Result<crate::poll::BuildResult> {
    trigger::write_trigger(job.project, job.output_path, job.scenes, job.build_target)?;
    tracing::info!(
        timeout_secs = job.poll.timeout.as_secs_f64(),
        "waiting for the editor to finish the build"
    );
    poll_result(job.project, job.poll)
}
