//! Layer contribution for Python packages
//!
//! Three sequential phases, each aborting the build on its first error:
//!
//! 1. Install packages into the packages layer (vendored or networked)
//! 2. Preserve pip's cache layer if pip created one
//! 3. Register the Procfile `web` command as a launch process
//!
//! Layers written before a failure are left for the host to clean up.

use crate::error::{PipLayersError, PipLayersResult};
use crate::installer::PackageInstaller;
use crate::layer::{
    content_identity, IdentityMode, LaunchMetadata, Layer, LayerFlag, LayerHost, LayerIdentity,
    Process,
};
use crate::packages::procfile;
use crate::plan::{BuildPlan, BUILD, LAUNCH};
use crate::ui;
use crate::{PIP_CACHE, PROCFILE, PYTHON_PACKAGES, REQUIREMENTS_FILE, VENDOR_DIR};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Env var pip's `--user` installs are rooted at
const PYTHONUSERBASE: &str = "PYTHONUSERBASE";

/// How the requirements were installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// From the package index, using the cache layer
    Network,
    /// From `vendor/`, without network access
    Vendored,
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Vendored => write!(f, "vendored"),
        }
    }
}

/// What a successful contribution produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub install_mode: InstallMode,
    pub identity: Option<LayerIdentity>,
    pub cache_preserved: bool,
    pub web_command: Option<String>,
}

/// Contributes the Python packages layer for one build
pub struct Contributor<'a> {
    installer: &'a dyn PackageInstaller,
    host: &'a dyn LayerHost,
    app_root: PathBuf,
    packages_layer: Box<dyn Layer>,
    cache_layer: Box<dyn Layer>,
    build_contribution: bool,
    launch_contribution: bool,
    identity_mode: IdentityMode,
}

impl<'a> Contributor<'a> {
    /// Create a contributor if the build plan selected `python-packages`.
    ///
    /// Returns `Ok(None)` when this buildpack was not selected. Fails with
    /// [`PipLayersError::MissingManifest`] when it was selected but the app
    /// has no `requirements.txt`.
    pub async fn new(
        plan: &BuildPlan,
        app_root: &Path,
        installer: &'a dyn PackageInstaller,
        host: &'a dyn LayerHost,
        identity_mode: IdentityMode,
    ) -> PipLayersResult<Option<Contributor<'a>>> {
        let Some(entry) = plan.shallow_merged(PYTHON_PACKAGES) else {
            debug!("{} not in build plan, skipping", PYTHON_PACKAGES);
            return Ok(None);
        };

        let requirements = app_root.join(REQUIREMENTS_FILE);
        let exists = tokio::fs::try_exists(&requirements).await.map_err(|e| {
            PipLayersError::io(format!("checking {}", requirements.display()), e)
        })?;
        if !exists {
            return Err(PipLayersError::MissingManifest(PathBuf::from(
                REQUIREMENTS_FILE,
            )));
        }

        Ok(Some(Self {
            installer,
            host,
            app_root: app_root.to_path_buf(),
            packages_layer: host.layer(PYTHON_PACKAGES),
            cache_layer: host.layer(PIP_CACHE),
            build_contribution: entry.flag(BUILD),
            launch_contribution: entry.flag(LAUNCH),
            identity_mode,
        }))
    }

    /// Whether the packages layer is exposed to later buildpacks
    pub fn build_contribution(&self) -> bool {
        self.build_contribution
    }

    /// Whether the packages layer is exported into the app image
    pub fn launch_contribution(&self) -> bool {
        self.launch_contribution
    }

    /// Run all three phases in order
    pub async fn contribute(&self) -> PipLayersResult<Contribution> {
        let (install_mode, identity) = self.contribute_python_modules().await?;
        let cache_preserved = self.contribute_pip_cache().await?;
        let web_command = self.contribute_start_command().await?;

        Ok(Contribution {
            install_mode,
            identity,
            cache_preserved,
            web_command,
        })
    }

    async fn contribute_python_modules(
        &self,
    ) -> PipLayersResult<(InstallMode, Option<LayerIdentity>)> {
        self.packages_layer.touch().await?;

        ui::title("Python Packages", "latest");

        let requirements = self.app_root.join(REQUIREMENTS_FILE);
        let vendor_dir = self.app_root.join(VENDOR_DIR);
        let location = self.packages_layer.root();

        let vendored = tokio::fs::try_exists(&vendor_dir)
            .await
            .map_err(|e| PipLayersError::VendorInspection {
                path: vendor_dir.clone(),
                source: e,
            })?;

        let mode = if vendored {
            ui::step_info("pip installing from vendor directory");
            self.installer
                .install_vendor(&requirements, location, &vendor_dir)
                .await?;
            InstallMode::Vendored
        } else {
            ui::step_info(&format!("pip installing to: {}", location.display()));
            self.installer
                .install(&requirements, location, self.cache_layer.root())
                .await?;
            InstallMode::Network
        };
        info!("Installed requirements ({})", mode);

        self.packages_layer
            .prepend_path_shared_env(PYTHONUSERBASE, location)
            .await?;

        let layer_name = self.packages_layer.name();
        debug!("Layer identity for {}: {}", layer_name, self.identity_mode);
        let identity = match self.identity_mode {
            IdentityMode::Content => {
                let vendor = vendored.then_some(vendor_dir.as_path());
                Some(content_identity(layer_name, &requirements, vendor).await?)
            }
            IdentityMode::None => None,
        };

        self.packages_layer
            .write_metadata(identity.as_ref(), &self.flags())
            .await?;

        Ok((mode, identity))
    }

    async fn contribute_pip_cache(&self) -> PipLayersResult<bool> {
        let cache_root = self.cache_layer.root();
        let exists = tokio::fs::try_exists(cache_root)
            .await
            .map_err(|e| PipLayersError::CacheInspection {
                path: cache_root.to_path_buf(),
                source: e,
            })?;

        if !exists {
            debug!(
                "No {} layer content at {}",
                self.cache_layer.name(),
                cache_root.display()
            );
            return Ok(false);
        }

        self.cache_layer.touch().await?;

        ui::title("PIP Cache", "latest");

        self.cache_layer
            .write_metadata(None, &[LayerFlag::Cache])
            .await?;
        Ok(true)
    }

    async fn contribute_start_command(&self) -> PipLayersResult<Option<String>> {
        let path = self.app_root.join(PROCFILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No Procfile, using the default launch command");
                return Ok(None);
            }
            Err(e) => return Err(PipLayersError::ProcfileRead { path, source: e }),
        };

        let Some(command) = procfile::web_command(&content) else {
            warn!("{} has no web process", path.display());
            ui::step_warn("Procfile has no web process");
            return Ok(None);
        };

        self.host
            .write_application_metadata(&LaunchMetadata {
                processes: vec![Process::new("web", command.clone())],
            })
            .await?;
        ui::step_ok(&format!("web: {}", command));

        Ok(Some(command))
    }

    fn flags(&self) -> Vec<LayerFlag> {
        let mut flags = Vec::new();
        if self.build_contribution {
            flags.push(LayerFlag::Build);
        }
        if self.launch_contribution {
            flags.push(LayerFlag::Launch);
        }
        flags
    }
}
