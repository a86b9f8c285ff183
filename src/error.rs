//! Error types for pip-layers
//!
//! All modules use `PipLayersResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pip-layers operations
pub type PipLayersResult<T> = Result<T, PipLayersError>;

/// All errors that can occur while detecting or building
#[derive(Error, Debug)]
pub enum PipLayersError {
    // Construction errors
    #[error("unable to find \"{}\"", .0.display())]
    MissingManifest(PathBuf),

    // Install phase
    #[error("pip install failed: {command}\n{output}")]
    InstallerFailure { command: String, output: String },

    #[error("unable to stat vendor dir {path}: {source}")]
    VendorInspection {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Cache phase
    #[error("unable to inspect pip cache {path}: {source}")]
    CacheInspection {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Start command phase
    #[error("unable to read Procfile {path}: {source}")]
    ProcfileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Host contract errors
    #[error("Invalid build plan at {path}: {reason}")]
    PlanInvalid { path: PathBuf, reason: String },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl PipLayersError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an installer failure from the command line and its captured output
    pub fn installer(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self::InstallerFailure {
            command: command.into(),
            output: output.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingManifest(_) => Some("Add a requirements.txt to the application root"),
            Self::InstallerFailure { .. } => {
                Some("Check the pip output above. Vendored apps need every wheel under vendor/")
            }
            Self::ConfigInvalid { .. } => {
                Some("Valid layer identities are \"content\" and \"none\"")
            }
            _ => None,
        }
    }
}
