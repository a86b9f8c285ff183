//! Build command - install requirements into layers

use crate::cli::args::BuildArgs;
use crate::cli::{exit, CommandError, WithExitCode};
use crate::config::Config;
use crate::installer::PipInstaller;
use crate::layer::Layers;
use crate::packages::{Contributor, InstallMode};
use crate::plan::BuildPlan;
use crate::ui;
use std::path::Path;
use tracing::{debug, info};

/// Execute the build command
pub async fn execute(
    args: BuildArgs,
    app_root: &Path,
    config: &Config,
) -> Result<u8, CommandError> {
    ui::title("pip-layers", env!("CARGO_PKG_VERSION"));

    debug!("Platform directory: {}", args.platform.display());

    let plan = BuildPlan::from_file(&args.plan)
        .await
        .exit_code(exit::NO_BUILD_CONTEXT)?;

    let layers = Layers::new(&args.layers);
    debug!("Layers directory: {}", layers.root().display());
    let installer = PipInstaller::new(config.pip.python.clone())
        .with_extra_args(config.pip.extra_args.clone());

    let contributor = Contributor::new(
        &plan,
        app_root,
        &installer,
        &layers,
        config.layers.identity,
    )
    .await
    .exit_code(exit::CONTRIBUTOR_FAILED)?;

    let Some(contributor) = contributor else {
        info!("python-packages not requested, nothing to contribute");
        return Ok(exit::SUCCESS);
    };
    debug!(
        "Contributing packages (build: {}, launch: {})",
        contributor.build_contribution(),
        contributor.launch_contribution()
    );

    let contribution = contributor
        .contribute()
        .await
        .exit_code(exit::CONTRIBUTE_FAILED)?;

    match contribution.install_mode {
        InstallMode::Vendored => info!("Installed requirements from vendor directory"),
        InstallMode::Network => info!("Installed requirements from package index"),
    }
    if let Some(identity) = &contribution.identity {
        debug!("Layer identity: {}", identity.hash);
    }

    let removed = layers
        .remove_untouched()
        .await
        .exit_code(exit::CONTRIBUTE_FAILED)?;
    for name in removed {
        info!("Removed stale layer: {}", name);
    }

    Ok(exit::SUCCESS)
}
