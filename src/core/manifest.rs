//! `package.json` manifest access.
//!
//! The manifest is kept as a JSON object so that fields pkgsmith does not
//! own survive a rewrite untouched and in their original order.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::util::fs::write_string;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "package.json";

/// Errors reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest is not a JSON object: {}", path.display())]
    NotAnObject { path: PathBuf },
}

/// Dependency sections of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Normal,
    Dev,
    Peer,
}

impl DependencyKind {
    /// All sections, in the order they are read.
    pub const ALL: [DependencyKind; 3] =
        [DependencyKind::Normal, DependencyKind::Dev, DependencyKind::Peer];

    /// Manifest field holding this section.
    pub fn field(&self) -> &'static str {
        match self {
            DependencyKind::Normal => "dependencies",
            DependencyKind::Dev => "devDependencies",
            DependencyKind::Peer => "peerDependencies",
        }
    }
}

/// A parsed `package.json`.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    data: Map<String, Value>,
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Parse manifest text that was read from `path`.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ManifestError> {
        let value: Value =
            serde_json::from_str(contents).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        match value {
            Value::Object(data) => Ok(Manifest {
                path: path.to_path_buf(),
                data,
            }),
            _ => Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Path the manifest was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the manifest.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Package name.
    pub fn name(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }

    /// Whether this manifest declares workspace members.
    pub fn has_workspaces(&self) -> bool {
        self.data.contains_key("workspaces")
    }

    /// Dependency names from the given sections, deduplicated in first-seen order.
    pub fn dependency_names(&self, kinds: &[DependencyKind]) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for kind in kinds {
            let Some(section) = self.data.get(kind.field()).and_then(Value::as_object) else {
                continue;
            };
            for name in section.keys() {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// The publish-time export map, if it is an object.
    pub fn publish_exports(&self) -> Option<&Map<String, Value>> {
        self.data
            .get("publishConfig")
            .and_then(|p| p.get("exports"))
            .and_then(Value::as_object)
    }

    /// Declaration path of the package root.
    ///
    /// Prefers the publish export map's `"."` entry, then `types`, then `typings`.
    pub fn root_types(&self) -> Option<&str> {
        self.publish_exports()
            .and_then(|exports| exports.get("."))
            .and_then(export_types)
            .or_else(|| self.data.get("types").and_then(Value::as_str))
            .or_else(|| self.data.get("typings").and_then(Value::as_str))
    }

    /// Look up a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Replace the development export map.
    pub fn set_exports(&mut self, exports: Value) {
        self.data.insert("exports".to_string(), exports);
    }

    /// Replace the publish-time export map.
    pub fn set_publish_exports(&mut self, exports: Value) {
        self.publish_config_mut()
            .insert("exports".to_string(), exports);
    }

    /// Mirror the root declaration path into `types` and `publishConfig.types`.
    pub fn set_types(&mut self, types: &str) {
        self.data
            .insert("types".to_string(), Value::String(types.to_string()));
        self.publish_config_mut()
            .insert("types".to_string(), Value::String(types.to_string()));
    }

    fn publish_config_mut(&mut self) -> &mut Map<String, Value> {
        let entry = self
            .data
            .entry("publishConfig")
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("publishConfig was just made an object"),
        }
    }

    /// Render as two-space indented JSON with a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.data)
            .context("failed to serialize manifest")?;
        out.push('\n');
        Ok(out)
    }

    /// Write the manifest back to where it was loaded from.
    pub fn save(&self) -> Result<()> {
        write_string(&self.path, &self.to_json_string()?)
    }
}

/// `types` condition of an export map value.
///
/// A bare string value points at runtime code, never at declarations.
pub fn export_types(value: &Value) -> Option<&str> {
    match value {
        Value::Object(conditions) => conditions.get("types").and_then(Value::as_str),
        _ => None,
    }
}
