//! Build plan types
//!
//! The detect step emits a [`Plan`] (what this buildpack requires and
//! provides). The host resolves plans from every participating buildpack
//! and hands the build step a [`BuildPlan`] of entries.

use crate::error::{PipLayersError, PipLayersResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Free-form metadata attached to a plan entry
pub type PlanMetadata = BTreeMap<String, toml::Value>;

/// Metadata key marking a dependency as needed during build
pub const BUILD: &str = "build";

/// Metadata key marking a dependency as needed at launch
pub const LAUNCH: &str = "launch";

/// A dependency this buildpack needs from some buildpack in the group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Required {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: PlanMetadata,
}

impl Required {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: PlanMetadata::new(),
        }
    }

    /// Mark the requirement as needed during build
    pub fn build(mut self) -> Self {
        self.metadata.insert(BUILD.to_string(), toml::Value::Boolean(true));
        self
    }

    /// Mark the requirement as needed at launch
    pub fn launch(mut self) -> Self {
        self.metadata
            .insert(LAUNCH.to_string(), toml::Value::Boolean(true));
        self
    }
}

/// A dependency this buildpack can supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provided {
    pub name: String,
}

impl Provided {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The requires/provides declaration written by detect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub provides: Vec<Provided>,

    #[serde(default)]
    pub requires: Vec<Required>,
}

impl Plan {
    /// Whether the plan provides the named dependency
    pub fn provides(&self, name: &str) -> bool {
        self.provides.iter().any(|p| p.name == name)
    }

    /// Serialize and write the plan to the host's plan path
    pub async fn write(&self, path: &Path) -> PipLayersResult<()> {
        let content = toml::to_string(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| PipLayersError::io(format!("writing plan to {}", path.display()), e))
    }
}

/// A single entry of the resolved build plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlanEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default)]
    pub metadata: PlanMetadata,
}

/// The resolved plan handed to the build step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default)]
    pub entries: Vec<BuildPlanEntry>,
}

/// All entries for one dependency folded into a single view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedEntry {
    pub name: String,
    pub metadata: PlanMetadata,
}

impl MergedEntry {
    /// Whether a flag is set. Only the key's presence counts, so
    /// `launch = false` still requests the launch contribution.
    pub fn flag(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }
}

impl BuildPlan {
    /// Parse a build plan from TOML
    pub fn parse(content: &str) -> PipLayersResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read the build plan written by the host
    pub async fn from_file(path: &Path) -> PipLayersResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            PipLayersError::io(format!("reading build plan {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| PipLayersError::PlanInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Fold every entry named `name` into one. Later entries win on
    /// conflicting metadata keys. Returns `None` when no entry carries the
    /// name, meaning this buildpack was not selected for it.
    pub fn shallow_merged(&self, name: &str) -> Option<MergedEntry> {
        let mut matching = self.entries.iter().filter(|e| e.name == name).peekable();
        matching.peek()?;

        let mut merged = MergedEntry {
            name: name.to_string(),
            metadata: PlanMetadata::new(),
        };
        for entry in matching {
            merged
                .metadata
                .extend(entry.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Some(merged)
    }
}
