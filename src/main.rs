//! pip-layers - Python packages buildpack
//!
//! CLI entry point that dispatches to the detect and build phases.

use clap::Parser;
use pip_layers::cli::{self, exit, Cli, CommandError, Commands, LogFormat, WithExitCode};
use pip_layers::config::ConfigManager;
use pip_layers::ui;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(CommandError { code, error }) => {
            ui::step_error(&error.to_string());
            if let Some(hint) = error.hint() {
                ui::hint(hint);
            }
            ExitCode::from(code)
        }
    }
}

async fn run() -> Result<u8, CommandError> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("pip_layers=warn"),
        1 => EnvFilter::new("pip_layers=info"),
        _ => EnvFilter::new("pip_layers=debug"),
    };

    // Logs go to stderr; stdout carries build output and `detect --json`
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => subscriber.without_time().init(),
        LogFormat::Json => subscriber.json().init(),
    }

    match cli.command {
        Commands::Detect(args) => cli::commands::detect(args, cli.app_dir).await,
        Commands::Build(args) => {
            let app_root = cli::app_root(cli.app_dir).exit_code(exit::NO_BUILD_CONTEXT)?;
            let config_manager = match cli.config {
                Some(path) => ConfigManager::with_path(path),
                None => ConfigManager::new(),
            };
            let config = config_manager
                .load(&app_root)
                .await
                .exit_code(exit::NO_BUILD_CONTEXT)?;
            cli::commands::build(args, &app_root, &config).await
        }
    }
}
