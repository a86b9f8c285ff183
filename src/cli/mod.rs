//! Command-line interface
//!
//! Each command returns the exit code the lifecycle should see, or a
//! [`CommandError`] carrying the error and its phase-specific code.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, LogFormat};

use crate::error::{PipLayersError, PipLayersResult};
use std::path::PathBuf;

/// Process exit codes
pub mod exit {
    /// Build or detect succeeded / detection passed
    pub const SUCCESS: u8 = 0;
    /// Detection did not pass
    pub const DETECT_FAIL: u8 = 100;
    /// Detection could not run
    pub const DETECT_ERROR: u8 = 101;
    /// Build context could not be established
    pub const NO_BUILD_CONTEXT: u8 = 100;
    /// Contributor construction failed
    pub const CONTRIBUTOR_FAILED: u8 = 102;
    /// A contribution phase failed
    pub const CONTRIBUTE_FAILED: u8 = 103;
}

/// An error paired with the exit code it maps to
#[derive(Debug)]
pub struct CommandError {
    pub code: u8,
    pub error: PipLayersError,
}

/// Tag a result's error with an exit code
pub trait WithExitCode<T> {
    fn exit_code(self, code: u8) -> Result<T, CommandError>;
}

impl<T> WithExitCode<T> for PipLayersResult<T> {
    fn exit_code(self, code: u8) -> Result<T, CommandError> {
        self.map_err(|error| CommandError { code, error })
    }
}

/// Resolve the application directory (explicit or current directory)
pub fn app_root(app_dir: Option<PathBuf>) -> PipLayersResult<PathBuf> {
    match app_dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir()
            .map_err(|e| PipLayersError::io("getting current directory", e)),
    }
}
