//! Detect command - write the requires/provides plan

use crate::cli::args::DetectArgs;
use crate::cli::{app_root, exit, CommandError, WithExitCode};
use crate::detect::detect;
use crate::error::PipLayersError;
use crate::{REQUIREMENTS, REQUIREMENTS_FILE};
use std::path::PathBuf;
use tracing::{debug, info};

/// Execute the detect command
pub async fn execute(args: DetectArgs, app_dir: Option<PathBuf>) -> Result<u8, CommandError> {
    let app_root = app_root(app_dir).exit_code(exit::DETECT_ERROR)?;
    debug!("Platform directory: {}", args.platform.display());

    let outcome = detect(&app_root).await.exit_code(exit::DETECT_ERROR)?;
    if !outcome.plan.provides(REQUIREMENTS) {
        info!("No {} in {}", REQUIREMENTS_FILE, app_root.display());
    }

    outcome
        .plan
        .write(&args.plan)
        .await
        .exit_code(exit::DETECT_ERROR)?;
    info!("Wrote plan to {}", args.plan.display());

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.plan)
            .map_err(PipLayersError::from)
            .exit_code(exit::DETECT_ERROR)?;
        println!("{}", json);
    }

    Ok(if outcome.pass {
        exit::SUCCESS
    } else {
        exit::DETECT_FAIL
    })
}
