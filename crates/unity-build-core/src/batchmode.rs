//! Unattended builds through `Unity -batchmode`.
//!
//! Only valid while no editor has the project open. The build parameters
//! reach the deployed `BuildScript.cs` as extra command-line arguments.

use crate::error::{BuildError, Result};
use crate::{deploy, io, lock, paths};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

pub const ARG_BATCHMODE: &str = "-batchmode";
pub const ARG_QUIT: &str = "-quit";
pub const ARG_NOGRAPHICS: &str = "-nographics";
pub const ARG_PROJECT_PATH: &str = "-projectPath";
pub const ARG_BUILD_TARGET: &str = "-buildTarget";
pub const ARG_EXECUTE_METHOD: &str = "-executeMethod";
pub const ARG_LOG_FILE: &str = "-logFile";
pub const ARG_BUILD_OUTPUT: &str = "-buildOutput";
pub const ARG_BUILD_SCENES: &str = "-buildScenes";

/// Lines of the Unity log shown when a build fails.
pub const LOG_TAIL_LINES: usize = 20;

const KILL_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct BatchmodeJob<'a> {
    pub unity_exe: &'a Path,
    pub project: &'a Path,
    pub build_target: &'a str,
    pub execute_method: &'a str,
    pub output_path: &'a Path,
    pub scenes: &'a [String],
    pub log_path: &'a Path,
    pub timeout: Duration,
}

/// Arguments passed to the Unity executable, in order.
pub fn command_args(job: &BatchmodeJob<'_>) -> Vec<OsString> {
    vec![
        ARG_BATCHMODE.into(),
        ARG_QUIT.into(),
        ARG_NOGRAPHICS.into(),
        ARG_PROJECT_PATH.into(),
        job.project.into(),
        ARG_BUILD_TARGET.into(),
        job.build_target.into(),
        ARG_EXECUTE_METHOD.into(),
        job.execute_method.into(),
        ARG_LOG_FILE.into(),
        job.log_path.into(),
        ARG_BUILD_OUTPUT.into(),
        job.output_path.into(),
        ARG_BUILD_SCENES.into(),
        job.scenes.join(";").into(),
    ]
}

/// `<log_folder>/build_<version>.log`
pub fn log_path(log_folder: &Path, version: &str) -> PathBuf {
    log_folder.join(format!("build_{version}.log"))
}

/// Run a batchmode build to completion.
///
/// Refuses a locked project before touching anything. `BuildScript.cs` is
/// present in the project only while Unity runs.
pub fn run_batchmode(job: &BatchmodeJob<'_>) -> Result<()> {
    if lock::is_editor_running(job.project) {
        return Err(BuildError::ProjectLocked(paths::lock_path(job.project)));
    }
    if let Some(dir) = job.log_path.parent() {
        io::ensure_dir(dir)?;
    }

    let script = deploy::deploy_build_script(job.project)?;
    let ran = run_unity(job);
    let cleaned = script.cleanup();

    let status = match (ran, cleaned) {
        (Ok(status), Ok(())) => status,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), cleaned) => {
            if let Err(cleanup_err) = cleaned {
                tracing::warn!(error = %cleanup_err, "build script cleanup failed after a failed run");
            }
            return Err(e);
        }
    };

    if !status.success() {
        return Err(BuildError::BuildFailed {
            code: status.code().unwrap_or(-1),
            log: job.log_path.to_path_buf(),
        });
    }
    Ok(())
}

fn run_unity(job: &BatchmodeJob<'_>) -> Result<ExitStatus> {
    let args = command_args(job);
    tracing::info!(exe = %job.unity_exe.display(), log = %job.log_path.display(), "starting Unity");
    tracing::debug!(?args, "Unity arguments");

    let mut child = Command::new(job.unity_exe)
        .args(&args)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| BuildError::Spawn(format!("{}: {e}", job.unity_exe.display())))?;
    let pid = child.id();
    let start = Instant::now();

    // The child moves to a waiter thread; on timeout it is killed by PID.
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(child.wait());
    });

    match rx.recv_timeout(job.timeout) {
        Ok(waited) => {
            let status = waited?;
            tracing::info!(
                code = ?status.code(),
                elapsed_secs = start.elapsed().as_secs(),
                "Unity exited"
            );
            Ok(status)
        }
        Err(_) => {
            tracing::warn!(timeout_secs = job.timeout.as_secs(), pid, "killing Unity after timeout");
            kill_process(pid);
            // Reap the killed process so it does not linger as a zombie.
            let _ = rx.recv_timeout(KILL_GRACE);
            Err(BuildError::BatchmodeTimeout(job.timeout.as_secs()))
        }
    }
}

#[cfg(not(windows))]
fn kill_process(pid: u32) {
    let _ = Command::new("kill")
        .arg("-9")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(windows)]
fn kill_process(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/F", "/T", "/PID"])
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn job<'a>(
        exe: &'a Path,
        project: &'a Path,
        log: &'a Path,
        scenes: &'a [String],
    ) -> BatchmodeJob<'a> {
        BatchmodeJob {
            unity_exe: exe,
            project,
            build_target: "Android",
            execute_method: "BuildAutomation.BuildScript.BuildAndroid",
            output_path: Path::new("/out/game_v1.0.0.apk"),
            scenes,
            log_path: log,
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn arguments_are_explicit() {
        let scenes = vec!["A.unity".to_string(), "B.unity".to_string()];
        let j = job(
            Path::new("/unity"),
            Path::new("/proj"),
            Path::new("/logs/build_1.0.0.log"),
            &scenes,
        );
        let args: Vec<String> = command_args(&j)
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();
        assert_eq!(
            args,
            [
                "-batchmode",
                "-quit",
                "-nographics",
                "-projectPath",
                "/proj",
                "-buildTarget",
                "Android",
                "-executeMethod",
                "BuildAutomation.BuildScript.BuildAndroid",
                "-logFile",
                "/logs/build_1.0.0.log",
                "-buildOutput",
                "/out/game_v1.0.0.apk",
                "-buildScenes",
                "A.unity;B.unity",
            ]
        );
    }

    #[test]
    fn log_path_is_versioned() {
        assert_eq!(
            log_path(Path::new("logs"), "0.1.0"),
            PathBuf::from("logs/build_0.1.0.log")
        );
    }

    #[test]
    fn locked_project_is_refused_before_side_effects() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Temp")).unwrap();
        std::fs::write(dir.path().join("Temp/UnityLockfile"), "").unwrap();
        let log = dir.path().join("logs/build.log");
        let scenes = vec!["A.unity".to_string()];

        let err = run_batchmode(&job(Path::new("/unity"), dir.path(), &log, &scenes)).unwrap_err();
        assert!(matches!(err, BuildError::ProjectLocked(_)));
        assert!(!dir.path().join("Assets").exists());
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn missing_executable_still_removes_build_script() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("logs/build.log");
        let scenes = vec!["A.unity".to_string()];
        let exe = dir.path().join("no-such-unity");

        let err = run_batchmode(&job(&exe, dir.path(), &log, &scenes)).unwrap_err();
        assert!(matches!(err, BuildError::Spawn(_)));
        assert!(!dir.path().join("Assets/Editor/BuildScript.cs").exists());
        assert!(dir.path().join("logs").is_dir());
    }

    #[cfg(unix)]
    fn fake_unity(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let exe = dir.join("fake-unity.sh");
        std::fs::write(&exe, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        exe
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_reports_code_and_log() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let exe = fake_unity(dir.path(), "exit 3");
        let log = dir.path().join("logs/build.log");
        let scenes = vec!["A.unity".to_string()];

        let err = run_batchmode(&job(&exe, &project, &log, &scenes)).unwrap_err();
        match err {
            BuildError::BuildFailed { code, log: reported } => {
                assert_eq!(code, 3);
                assert_eq!(reported, log);
            }
            other => panic!("expected build failure, got {other:?}"),
        }
        assert!(!project.join("Assets/Editor/BuildScript.cs").exists());
    }

    #[cfg(unix)]
    #[test]
    fn script_is_present_while_unity_runs() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let exe = fake_unity(
            dir.path(),
            r#"while [ "$1" != "-projectPath" ]; do shift; done
test -f "$2/Assets/Editor/BuildScript.cs""#,
        );
        let log = dir.path().join("logs/build.log");
        let scenes = vec!["A.unity".to_string()];

        run_batchmode(&job(&exe, &project, &log, &scenes)).unwrap();
        assert!(!project.join("Assets/Editor/BuildScript.cs").exists());
    }

    #[cfg(unix)]
    #[test]
    fn hung_unity_is_killed_after_timeout() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let exe = fake_unity(dir.path(), "exec sleep 30");
        let log = dir.path().join("logs/build.log");
        let scenes = vec!["A.unity".to_string()];
        let mut j = job(&exe, &project, &log, &scenes);
        j.timeout = Duration::from_secs(1);

        let start = Instant::now();
        let err = run_batchmode(&j).unwrap_err();

        assert!(matches!(err, BuildError::BatchmodeTimeout(1)), "got {err:?}");
        assert_eq!(err.to_string(), "Unity build timed out after 1 seconds");
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(!project.join("Assets/Editor/BuildScript.cs").exists());
    }
}
