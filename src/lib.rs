//! pip-layers - Python packages buildpack
//!
//! Detects applications that carry a `requirements.txt`, installs their
//! packages into a Cloud Native Buildpacks layer and preserves the pip
//! download cache between builds.

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod installer;
pub mod layer;
pub mod packages;
pub mod plan;
pub mod ui;

pub use error::{PipLayersError, PipLayersResult};

/// Plan entry for the Python interpreter
pub const PYTHON: &str = "python";

/// Plan entry and layer name for installed packages
pub const PYTHON_PACKAGES: &str = "python-packages";

/// Plan entry for the requirements manifest
pub const REQUIREMENTS: &str = "requirements";

/// Requirements manifest in the application root
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Layer holding pip's download cache
pub const PIP_CACHE: &str = "pip-cache";

/// Process declarations in the application root
pub const PROCFILE: &str = "Procfile";

/// Pre-downloaded distributions in the application root
pub const VENDOR_DIR: &str = "vendor";
