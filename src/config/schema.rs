//! Configuration schema for pip-layers
//!
//! Configuration is read from `.pip-layers.toml` in the application root,
//! or from the file given with `--config`.

use crate::layer::IdentityMode;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// pip invocation settings
    pub pip: PipConfig,

    /// Layer settings
    pub layers: LayersConfig,
}

/// pip invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipConfig {
    /// Interpreter used to run `-m pip`
    pub python: String,

    /// Extra arguments appended to every `pip install`
    pub extra_args: Vec<String>,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            python: "python".to_string(),
            extra_args: vec![],
        }
    }
}

/// Layer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    /// How the packages layer identity is computed: "content" or "none"
    pub identity: IdentityMode,
}
