//! Content-addressed layer identity
//!
//! The packages layer identity is derived from `requirements.txt` and, for
//! vendored apps, every file under `vendor/`. Same inputs = same identity,
//! so the host can tell a changed manifest from an unchanged one.

use crate::error::{PipLayersError, PipLayersResult};
use crate::layer::LayerIdentity;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

/// How the packages layer identity is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// SHA-256 over the manifest and vendor tree
    #[default]
    Content,
    /// No identity; the layer is considered fresh by name alone
    None,
}

impl fmt::Display for IdentityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Compute the identity of layer `name` from the manifest and optional
/// vendor directory
pub async fn content_identity(
    name: &str,
    manifest: &Path,
    vendor_dir: Option<&Path>,
) -> PipLayersResult<LayerIdentity> {
    let manifest = manifest.to_path_buf();
    let vendor_dir = vendor_dir.map(Path::to_path_buf);

    let hash = tokio::task::spawn_blocking(move || hash_inputs(&manifest, vendor_dir.as_deref()))
        .await
        .map_err(|e| PipLayersError::io("hashing layer inputs", std::io::Error::other(e)))??;

    Ok(LayerIdentity {
        name: name.to_string(),
        hash,
    })
}

fn hash_inputs(manifest: &Path, vendor_dir: Option<&Path>) -> PipLayersResult<String> {
    let mut hasher = Sha256::new();

    let contents = std::fs::read(manifest)
        .map_err(|e| PipLayersError::io(format!("reading {}", manifest.display()), e))?;
    hasher.update(&contents);

    if let Some(vendor_dir) = vendor_dir {
        // Sorted walk so the hash does not depend on directory order
        for entry in WalkDir::new(vendor_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                PipLayersError::io(
                    format!("walking {}", vendor_dir.display()),
                    std::io::Error::other(e),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(vendor_dir)
                .unwrap_or(entry.path());
            let contents = std::fs::read(entry.path())
                .map_err(|e| PipLayersError::io(format!("reading {}", entry.path().display()), e))?;

            // Each part is length-prefixed
            let relative = relative.to_string_lossy();
            hasher.update((relative.len() as u64).to_le_bytes());
            hasher.update(relative.as_bytes());
            hasher.update((contents.len() as u64).to_le_bytes());
            hasher.update(&contents);
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn identity_is_deterministic() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "requirements.txt", "flask==3.0.0\n");
        let manifest = temp.path().join("requirements.txt");

        let a = content_identity("python-packages", &manifest, None).await.unwrap();
        let b = content_identity("python-packages", &manifest, None).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.name, "python-packages");
        assert_eq!(a.hash.len(), 64);
    }

    #[tokio::test]
    async fn identity_tracks_manifest_changes() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("requirements.txt");

        write(temp.path(), "requirements.txt", "flask==3.0.0\n");
        let before = content_identity("p", &manifest, None).await.unwrap();

        write(temp.path(), "requirements.txt", "flask==3.0.0\nitsdangerous\n");
        let after = content_identity("p", &manifest, None).await.unwrap();

        assert_ne!(before.hash, after.hash);
    }

    #[tokio::test]
    async fn identity_tracks_vendor_tree() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "requirements.txt", "flask\n");
        write(temp.path(), "vendor/Flask-3.0.0-py3-none-any.whl", "wheel-a");
        let manifest = temp.path().join("requirements.txt");
        let vendor = temp.path().join("vendor");

        let without_vendor = content_identity("p", &manifest, None).await.unwrap();
        let first = content_identity("p", &manifest, Some(&vendor)).await.unwrap();
        assert_ne!(without_vendor.hash, first.hash);

        write(temp.path(), "vendor/nested/itsdangerous.whl", "wheel-b");
        let second = content_identity("p", &manifest, Some(&vendor)).await.unwrap();
        assert_ne!(first.hash, second.hash);
    }

    #[tokio::test]
    async fn identity_separates_vendor_paths_from_contents() {
        let left = TempDir::new().unwrap();
        write(left.path(), "requirements.txt", "flask\n");
        write(left.path(), "vendor/a", "bc");

        let right = TempDir::new().unwrap();
        write(right.path(), "requirements.txt", "flask\n");
        write(right.path(), "vendor/ab", "c");

        let a = content_identity(
            "p",
            &left.path().join("requirements.txt"),
            Some(&left.path().join("vendor")),
        )
        .await
        .unwrap();
        let b = content_identity(
            "p",
            &right.path().join("requirements.txt"),
            Some(&right.path().join("vendor")),
        )
        .await
        .unwrap();

        assert_ne!(a.hash, b.hash);
    }

    #[tokio::test]
    async fn identity_missing_manifest_errors() {
        let temp = TempDir::new().unwrap();
        let result = content_identity("p", &temp.path().join("requirements.txt"), None).await;
        assert!(matches!(result, Err(PipLayersError::Io { .. })));
    }

    #[test]
    fn identity_mode_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            identity: IdentityMode,
        }
        let parsed: Wrapper = toml::from_str("identity = \"none\"").unwrap();
        assert_eq!(parsed.identity, IdentityMode::None);
        assert_eq!(IdentityMode::default().to_string(), "content");
    }
}
