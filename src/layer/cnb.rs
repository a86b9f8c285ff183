//! Cloud Native Buildpacks layer layout
//!
//! Each layer is `<layers>/<name>/` with its metadata in
//! `<layers>/<name>.toml`. Shared environment mutations go under
//! `<layers>/<name>/env/`, launch processes into `<layers>/launch.toml`.

use crate::error::{PipLayersError, PipLayersResult};
use crate::layer::{Layer, LayerFlag, LayerHost, LayerIdentity, LaunchMetadata};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Files in the layers directory that are not layer metadata
const RESERVED: &[&str] = &["launch", "build", "store"];

/// On-disk form of `<layers>/<name>.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMetadataFile {
    #[serde(default)]
    pub launch: bool,

    #[serde(default)]
    pub build: bool,

    #[serde(default)]
    pub cache: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<LayerIdentity>,
}

impl LayerMetadataFile {
    fn new(identity: Option<&LayerIdentity>, flags: &[LayerFlag]) -> Self {
        Self {
            launch: flags.contains(&LayerFlag::Launch),
            build: flags.contains(&LayerFlag::Build),
            cache: flags.contains(&LayerFlag::Cache),
            metadata: identity.cloned(),
        }
    }
}

type Touched = Arc<Mutex<BTreeSet<String>>>;

/// The layers directory of one build
#[derive(Debug, Clone)]
pub struct Layers {
    root: PathBuf,
    touched: Touched,
}

impl Layers {
    /// Create a handle to the layers directory given by the host
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            touched: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    /// Layers directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a layer's metadata file
    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.toml", name))
    }

    /// Read a layer's metadata file, if one exists
    pub async fn read_metadata(&self, name: &str) -> PipLayersResult<Option<LayerMetadataFile>> {
        let path = self.metadata_path(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(toml::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PipLayersError::io(format!("reading {}", path.display()), e)),
        }
    }

    /// Names of the layers touched so far
    pub fn touched(&self) -> Vec<String> {
        lock(&self.touched).iter().cloned().collect()
    }

    /// Delete the metadata of every layer this build did not touch, so the
    /// host does not restore or export stale layers.
    pub async fn remove_untouched(&self) -> PipLayersResult<Vec<String>> {
        let mut removed = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
            Err(e) => {
                return Err(PipLayersError::io(
                    format!("listing layers in {}", self.root.display()),
                    e,
                ))
            }
        };

        let touched = self.touched();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipLayersError::io("reading layers directory", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if RESERVED.contains(&name) || touched.iter().any(|t| t == name) {
                continue;
            }

            debug!("Removing untouched layer metadata {}", path.display());
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| PipLayersError::io(format!("removing {}", path.display()), e))?;
            removed.push(name.to_string());
        }

        removed.sort();
        Ok(removed)
    }
}

#[async_trait]
impl LayerHost for Layers {
    fn layer(&self, name: &str) -> Box<dyn Layer> {
        Box::new(CnbLayer {
            name: name.to_string(),
            root: self.root.join(name),
            metadata_path: self.metadata_path(name),
            touched: Arc::clone(&self.touched),
        })
    }

    async fn write_application_metadata(&self, metadata: &LaunchMetadata) -> PipLayersResult<()> {
        ensure_dir(&self.root).await?;

        let path = self.root.join("launch.toml");
        let content = toml::to_string(metadata)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| PipLayersError::io(format!("writing {}", path.display()), e))?;

        debug!("Wrote launch metadata to {}", path.display());
        Ok(())
    }
}

/// A layer inside a CNB layers directory
#[derive(Debug)]
pub struct CnbLayer {
    name: String,
    root: PathBuf,
    metadata_path: PathBuf,
    touched: Touched,
}

#[async_trait]
impl Layer for CnbLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    async fn touch(&self) -> PipLayersResult<()> {
        lock(&self.touched).insert(self.name.clone());

        match tokio::fs::remove_file(&self.metadata_path).await {
            Ok(()) => {
                debug!("Cleared previous metadata for layer {}", self.name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipLayersError::io(
                format!("clearing {}", self.metadata_path.display()),
                e,
            )),
        }
    }

    async fn write_metadata(
        &self,
        identity: Option<&LayerIdentity>,
        flags: &[LayerFlag],
    ) -> PipLayersResult<()> {
        ensure_dir(&self.root).await?;

        let content = toml::to_string(&LayerMetadataFile::new(identity, flags))?;
        tokio::fs::write(&self.metadata_path, content)
            .await
            .map_err(|e| {
                PipLayersError::io(format!("writing {}", self.metadata_path.display()), e)
            })?;

        debug!("Wrote metadata for layer {} ({:?})", self.name, flags);
        Ok(())
    }

    async fn prepend_path_shared_env(&self, name: &str, value: &Path) -> PipLayersResult<()> {
        let env_dir = self.root.join("env");
        ensure_dir(&env_dir).await?;

        let prepend = env_dir.join(format!("{}.prepend", name));
        tokio::fs::write(&prepend, value.to_string_lossy().as_bytes())
            .await
            .map_err(|e| PipLayersError::io(format!("writing {}", prepend.display()), e))?;

        let delim = env_dir.join(format!("{}.delim", name));
        tokio::fs::write(&delim, PATH_LIST_SEPARATOR)
            .await
            .map_err(|e| PipLayersError::io(format!("writing {}", delim.display()), e))?;

        Ok(())
    }
}

#[cfg(unix)]
const PATH_LIST_SEPARATOR: &str = ":";
#[cfg(not(unix))]
const PATH_LIST_SEPARATOR: &str = ";";

fn lock(touched: &Touched) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
    touched.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn ensure_dir(dir: &Path) -> PipLayersResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PipLayersError::io(format!("creating directory {}", dir.display()), e))
}
