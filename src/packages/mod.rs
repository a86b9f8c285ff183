//! Python packages contribution
//!
//! Installs the application's requirements into the `python-packages`
//! layer, preserves pip's download cache, and derives the `web` process from
//! the Procfile.

mod contributor;
pub mod procfile;

pub use contributor::{Contribution, Contributor, InstallMode};
