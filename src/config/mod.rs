//! Configuration management for pip-layers

pub mod schema;

pub use schema::Config;

use crate::error::{PipLayersError, PipLayersResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the app-local configuration file
pub const LOCAL_CONFIG_FILE: &str = ".pip-layers.toml";

/// Configuration manager
#[derive(Debug)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Discover configuration in the application root
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Use an explicit configuration file
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
        }
    }

    /// Find `.pip-layers.toml` in the application root
    pub fn find_local_config(app_root: &Path) -> Option<PathBuf> {
        let path = app_root.join(LOCAL_CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Load configuration for `app_root`.
    ///
    /// An explicit path must exist. Without one, the app-local file is used
    /// when present and defaults otherwise.
    pub async fn load(&self, app_root: &Path) -> PipLayersResult<Config> {
        let path = match &self.config_path {
            Some(path) => path.clone(),
            None => match Self::find_local_config(app_root) {
                Some(path) => path,
                None => {
                    debug!("No {} found, using defaults", LOCAL_CONFIG_FILE);
                    return Ok(Config::default());
                }
            },
        };

        debug!("Loading config from {}", path.display());
        Self::load_from_file(&path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(path: &Path) -> PipLayersResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PipLayersError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| PipLayersError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
