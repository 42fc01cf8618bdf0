mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{build::BuildArgs, config::ConfigSubcommand};
use std::path::PathBuf;
use unity_build_core::config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(
    name = "unity-build",
    about = "Build a Unity project from the command line, in batchmode or through a running editor",
    version
)]
struct Cli {
    /// Path to the build config
    #[arg(long, global = true, env = "UNITY_BUILD_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log debug detail to stderr
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project (batchmode if the editor is closed, trigger if open)
    Build(BuildArgs),

    /// Show whether the editor holds the project and which strategy would run
    Status,

    /// Show or rediscover the Unity editors folder
    Editors {
        /// Ignore the config and cache and scan drives again
        #[arg(long)]
        rescan: bool,
    },

    /// Validate the build config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => cmd::build::run(&cli.config, args, cli.json),
        Commands::Status => cmd::status::run(&cli.config, cli.json),
        Commands::Editors { rescan } => cmd::editors::run(&cli.config, rescan, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&cli.config, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
