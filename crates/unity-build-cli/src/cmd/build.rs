use crate::output::{print_fields, print_json};
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use unity_build_core::{
    batchmode::{self, BatchmodeJob, LOG_TAIL_LINES},
    config::{BuildConfig, WarnLevel},
    cycle::{run_trigger_cycle, TriggerJob},
    discovery, io, lock,
    poll::PollOptions,
    strategy::select_strategy,
    types::{BuildMode, BuildStrategy, IncrementKind},
    version::{self, Version},
    BuildError,
};

use super::editors::resolve_editors_path;

#[derive(Args)]
pub struct BuildArgs {
    /// Build exactly this version (X.Y.Z) instead of incrementing
    #[arg(long = "version", value_name = "X.Y.Z")]
    explicit_version: Option<String>,

    /// Version increment: major, minor or patch (overrides config)
    #[arg(long)]
    increment: Option<IncrementKind>,

    /// Build mode: auto, batchmode or trigger (overrides config)
    #[arg(long)]
    mode: Option<BuildMode>,

    /// Print the build plan without executing
    #[arg(long)]
    dry_run: bool,

    /// Seconds to wait for the editor's result in trigger mode
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Seconds between checks for the editor's result in trigger mode
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<f64>,
}

/// Everything decided before any side effect.
#[derive(Debug, Serialize)]
struct BuildPlan {
    version: Version,
    apk: PathBuf,
    strategy: BuildStrategy,
    mode: BuildMode,
    editor_running: bool,
    project: PathBuf,
    scenes: Vec<String>,
    build_target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unity_exe: Option<PathBuf>,
    #[serde(skip)]
    poll: PollOptions,
}

#[derive(Debug, Serialize)]
struct BuildReport {
    version: Version,
    apk: PathBuf,
    strategy: BuildStrategy,
    size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<f64>,
}

pub fn run(config_path: &Path, args: BuildArgs, json: bool) -> anyhow::Result<()> {
    let config = BuildConfig::load(config_path).context("failed to load config")?;
    let errors: Vec<String> = config
        .validate()
        .into_iter()
        .filter(|w| w.level == WarnLevel::Error)
        .map(|w| w.message)
        .collect();
    if !errors.is_empty() {
        anyhow::bail!("invalid config: {}", errors.join("; "));
    }

    let plan = plan(config_path, &config, &args)?;

    if args.dry_run {
        if json {
            return print_json(&plan);
        }
        println!("--- DRY RUN ---");
        print_plan(&plan);
        return Ok(());
    }
    if !json {
        print_plan(&plan);
    }

    let duration_seconds = match plan.strategy {
        BuildStrategy::Batchmode => {
            build_batchmode(&config, &plan)?;
            None
        }
        BuildStrategy::Trigger => Some(build_trigger(&config, &plan)?),
    };

    let size_bytes = std::fs::metadata(&plan.apk)
        .map(|m| m.len())
        .map_err(|_| BuildError::ApkNotFound(plan.apk.clone()))?;

    let report = BuildReport {
        version: plan.version,
        apk: plan.apk,
        strategy: plan.strategy,
        size_bytes,
        duration_seconds,
    };
    if json {
        return print_json(&report);
    }
    println!("\nBuild successful!");
    print_fields(&[
        ("APK", report.apk.display().to_string()),
        ("Size", format!("{:.1} MB", size_bytes as f64 / (1024.0 * 1024.0))),
    ]);
    Ok(())
}

fn plan(config_path: &Path, config: &BuildConfig, args: &BuildArgs) -> anyhow::Result<BuildPlan> {
    let increment = args.increment.unwrap_or(config.version_increment);
    let version = version::resolve_version(
        args.explicit_version.as_deref(),
        increment,
        &config.output_folder,
        &config.apk_prefix,
    )?;
    let output_folder = std::path::absolute(&config.output_folder)
        .with_context(|| format!("cannot resolve {}", config.output_folder.display()))?;
    let apk = output_folder.join(version::apk_file_name(&config.apk_prefix, version));

    // CLI flag > config > auto
    let mode = args.mode.unwrap_or(config.build_mode);
    let editor_running = lock::is_editor_running(&config.project_path);
    let strategy = select_strategy(mode, editor_running);

    let unity_exe = match strategy {
        BuildStrategy::Batchmode => {
            let editors = resolve_editors_path(config_path, config)?;
            Some(discovery::find_unity_executable(&editors, &config.unity_version)?)
        }
        BuildStrategy::Trigger => None,
    };

    let mut poll = config.poll_options();
    if let Some(secs) = args.timeout {
        poll.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.poll_interval {
        poll.interval = Duration::try_from_secs_f64(secs)
            .ok()
            .filter(|d| !d.is_zero())
            .with_context(|| format!("invalid --poll-interval {secs}"))?;
    }

    Ok(BuildPlan {
        version,
        apk,
        strategy,
        mode,
        editor_running,
        project: config.project_path.clone(),
        scenes: config.scenes.clone(),
        build_target: config.build_target.clone(),
        unity_exe,
        poll,
    })
}

fn print_plan(plan: &BuildPlan) {
    let mut rows = vec![
        ("Project", plan.project.display().to_string()),
        ("Version", plan.version.to_string()),
        ("Output", plan.apk.display().to_string()),
        ("Scenes", plan.scenes.join(", ")),
        ("Target", plan.build_target.clone()),
        ("Mode", plan.mode.to_string()),
        ("Strategy", plan.strategy.to_string()),
    ];
    if let Some(exe) = &plan.unity_exe {
        rows.push(("Unity", exe.display().to_string()));
    }
    print_fields(&rows);
}

fn build_batchmode(config: &BuildConfig, plan: &BuildPlan) -> anyhow::Result<()> {
    let unity_exe = plan
        .unity_exe
        .as_deref()
        .context("batchmode build without a Unity executable")?;
    let log_folder = std::path::absolute(&config.log_folder)
        .with_context(|| format!("cannot resolve {}", config.log_folder.display()))?;
    let log_path = batchmode::log_path(&log_folder, &plan.version.to_string());

    println!("\nStarting Unity build (this may take a while)...");
    println!("Log: {}", log_path.display());
    let job = BatchmodeJob {
        unity_exe,
        project: &plan.project,
        build_target: &plan.build_target,
        execute_method: &config.build_script_method,
        output_path: &plan.apk,
        scenes: &plan.scenes,
        log_path: &log_path,
        timeout: config.batchmode_timeout(),
    };

    match batchmode::run_batchmode(&job) {
        Ok(()) => Ok(()),
        Err(BuildError::BuildFailed { code, log }) => {
            eprintln!("error: Unity build failed with exit code {code}. Check log: {}", log.display());
            print_log_tail(&log);
            std::process::exit(code);
        }
        Err(e) => Err(e).context("batchmode build failed"),
    }
}

fn print_log_tail(log: &Path) {
    match io::tail_lines(log, LOG_TAIL_LINES) {
        Ok(lines) if !lines.is_empty() => {
            eprintln!("\n--- Last {} lines of build log ---", lines.len());
            for line in lines {
                eprintln!("{line}");
            }
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(error = %e, "build log unavailable"),
    }
}

fn build_trigger(config: &BuildConfig, plan: &BuildPlan) -> anyhow::Result<f64> {
    println!(
        "\nHanding the build to the running editor (timeout: {}s)...",
        plan.poll.timeout.as_secs()
    );
    let job = TriggerJob {
        project: &config.project_path,
        output_path: &plan.apk,
        scenes: &plan.scenes,
        build_target: &plan.build_target,
        poll: plan.poll,
    };
    let outcome = run_trigger_cycle(&job).context("trigger build failed")?;
    println!("Editor build completed in {:.1}s", outcome.duration_seconds);
    Ok(outcome.duration_seconds)
}
