//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pip-layers - Python packages buildpack
///
/// Detects Python requirements and installs them into cacheable layers
/// following the Cloud Native Buildpacks layout.
#[derive(Parser, Debug)]
#[command(name = "pip-layers")]
#[command(author, version, about = "pip-layers - Python packages buildpack", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file path (defaults to .pip-layers.toml in the app)
    #[arg(short, long, global = true, env = "PIP_LAYERS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Application directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub app_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Declare what this buildpack requires and provides
    Detect(DetectArgs),

    /// Install requirements and contribute layers
    Build(BuildArgs),
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Platform directory provided by the lifecycle
    pub platform: PathBuf,

    /// Path the build plan is written to
    pub plan: PathBuf,

    /// Also print the plan as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Layers directory provided by the lifecycle
    pub layers: PathBuf,

    /// Platform directory provided by the lifecycle
    pub platform: PathBuf,

    /// Resolved build plan
    pub plan: PathBuf,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
