//! Layer contract
//!
//! A layer is a directory plus a metadata file owned by the host platform.
//! Build steps only touch layers, write their metadata and register
//! environment mutations through the [`Layer`] trait, and write launch
//! processes through [`LayerHost`]. The filesystem layout used by Cloud
//! Native Buildpacks lives in [`cnb`].

pub mod cnb;
pub mod identity;

pub use cnb::Layers;
pub use identity::{content_identity, IdentityMode};

use crate::error::PipLayersResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Visibility and reuse markers written into a layer's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerFlag {
    /// Available to subsequent buildpacks during the build
    Build,
    /// Restored into the next build
    Cache,
    /// Exported into the application image
    Launch,
}

impl fmt::Display for LayerFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Build => "build",
            Self::Cache => "cache",
            Self::Launch => "launch",
        };
        write!(f, "{}", name)
    }
}

/// Content identity of a layer. The host reuses an existing layer when the
/// stored identity matches the one written by this build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerIdentity {
    pub name: String,
    pub hash: String,
}

/// A process the application image can be launched with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
}

impl Process {
    pub fn new(kind: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            command: command.into(),
        }
    }
}

/// Launch metadata for the application image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMetadata {
    #[serde(default)]
    pub processes: Vec<Process>,
}

/// Handle to a single host-managed layer
#[async_trait]
pub trait Layer: Send + Sync {
    /// Layer name
    fn name(&self) -> &str;

    /// Directory the layer contents live in
    fn root(&self) -> &Path;

    /// Mark the layer as used by this build, dropping any metadata left by
    /// a previous build until new metadata is written
    async fn touch(&self) -> PipLayersResult<()>;

    /// Write the layer metadata with an optional identity and its flags
    async fn write_metadata(
        &self,
        identity: Option<&LayerIdentity>,
        flags: &[LayerFlag],
    ) -> PipLayersResult<()>;

    /// Prepend `value` to env var `name` for both build and launch
    async fn prepend_path_shared_env(&self, name: &str, value: &Path) -> PipLayersResult<()>;
}

/// The host's set of layers for one build
#[async_trait]
pub trait LayerHost: Send + Sync {
    /// Get a handle to the named layer
    fn layer(&self, name: &str) -> Box<dyn Layer>;

    /// Write the processes the application image exposes
    async fn write_application_metadata(&self, metadata: &LaunchMetadata) -> PipLayersResult<()>;
}
