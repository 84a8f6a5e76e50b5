//! Workspace discovery and cross-package declaration path mapping.
//!
//! When a package depends on a sibling in the same monorepo, the declaration
//! compiler has to find the sibling's `.d.ts` output. This module locates the
//! workspace root, scans the member manifests, and builds the `paths` table
//! handed to the compiler.
//!
//! Everything here is best-effort: a missing workspace, an unparsable
//! manifest or a dependency without declarations only removes entries from
//! the table.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde_json::{Map, Value};

use crate::core::manifest::{
    export_types, DependencyKind, Manifest, ManifestError, MANIFEST_NAME,
};
use crate::core::target::OUT_DIR;
use crate::util::fs::relative_slash_path;

/// Member manifest locations, relative to the workspace root.
pub const MEMBER_GLOBS: &[&str] = &["packages/*/package.json", "packages/*/*/package.json"];

/// A member package of the workspace.
#[derive(Debug, Clone)]
pub struct WorkspacePackage {
    name: String,
    dir: PathBuf,
    manifest: Manifest,
}

impl WorkspacePackage {
    /// Wrap a member manifest. Unnamed packages cannot be depended on.
    pub fn from_manifest(manifest: Manifest) -> Option<Self> {
        let name = manifest.name()?.to_string();
        Some(WorkspacePackage {
            name,
            dir: manifest.dir().to_path_buf(),
            manifest,
        })
    }

    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Package manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

/// A monorepo root and its member packages.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    packages: Vec<WorkspacePackage>,
}

impl Workspace {
    /// Find the workspace enclosing `package_dir` and load its members.
    pub fn discover(package_dir: &Path) -> Option<Workspace> {
        let root = find_workspace_root(package_dir)?;
        Some(Workspace::load(root))
    }

    /// Load the members of the workspace rooted at `root`.
    pub fn load(root: PathBuf) -> Workspace {
        let packages = scan_member_manifests(&root)
            .into_iter()
            .filter_map(|result| match result {
                Ok(manifest) => WorkspacePackage::from_manifest(manifest),
                Err(e) => {
                    tracing::debug!("skipping workspace member: {}", e);
                    None
                }
            })
            .collect();

        Workspace { root, packages }
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Member packages, in path order.
    pub fn packages(&self) -> &[WorkspacePackage] {
        &self.packages
    }

    /// Find a member by name. The first match in path order wins.
    pub fn member(&self, name: &str) -> Option<&WorkspacePackage> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Build the declaration path mapping for a consuming package.
    ///
    /// Only dependencies whose names start with `internal_scope` are mapped.
    /// All paths are relative to `package_dir`.
    pub fn path_mappings(
        &self,
        package_dir: &Path,
        manifest: &Manifest,
        internal_scope: &str,
    ) -> PathMappingTable {
        let mut table = PathMappingTable::new();

        let internal = manifest
            .dependency_names(&DependencyKind::ALL)
            .into_iter()
            .filter(|name| {
                name.starts_with(internal_scope) && Some(*name) != manifest.name()
            });

        for name in internal {
            let Some(dep) = self.member(name) else {
                tracing::debug!("no workspace member named `{}`", name);
                continue;
            };
            add_dependency_mappings(&mut table, package_dir, dep);
        }

        table
    }
}

fn add_dependency_mappings(
    table: &mut PathMappingTable,
    package_dir: &Path,
    dep: &WorkspacePackage,
) {
    let resolve =
        |declared: &str| relative_slash_path(package_dir, &dep.dir.join(trim_dot_slash(declared)));

    if let Some(types) = dep.manifest.root_types() {
        table.insert(dep.name.clone(), resolve(types));
    }

    table.insert(
        format!("{}/*", dep.name),
        format!("{}/*", relative_slash_path(package_dir, &dep.dir.join(OUT_DIR))),
    );

    let Some(exports) = dep.manifest.publish_exports() else {
        return;
    };
    for (key, value) in exports {
        if key == "." || key == "./*" {
            continue;
        }
        let Some(types) = export_types(value) else {
            continue;
        };
        let subpath = trim_dot_slash(key);
        if is_canonical_types_path(subpath, types) {
            continue;
        }
        table.insert(format!("{}/{}", dep.name, subpath), resolve(types));
    }
}

/// Whether a subpath's declaration sits where the wildcard mapping finds it.
fn is_canonical_types_path(subpath: &str, types: &str) -> bool {
    let types = trim_dot_slash(types);
    types == format!("{}/{}.d.ts", OUT_DIR, subpath)
        || types == format!("{}/{}/index.d.ts", OUT_DIR, subpath)
}

fn trim_dot_slash(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

/// Walk up from `start` to the first directory whose manifest declares `workspaces`.
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let manifest_path = dir.join(MANIFEST_NAME);
        if !manifest_path.is_file() {
            continue;
        }
        match Manifest::load(&manifest_path) {
            Ok(manifest) if manifest.has_workspaces() => return Some(dir.to_path_buf()),
            Ok(_) => {}
            Err(e) => tracing::debug!("ignoring manifest while looking for workspace: {}", e),
        }
    }
    None
}

/// Parse every member manifest under `root`, keeping failures as values.
pub fn scan_member_manifests(root: &Path) -> Vec<Result<Manifest, ManifestError>> {
    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let mut paths = BTreeSet::new();

    for member_glob in MEMBER_GLOBS {
        let pattern = format!("{}/{}", escaped_root.trim_end_matches('/'), member_glob);
        let Ok(matches) = glob::glob(&pattern) else {
            continue;
        };
        for path in matches.filter_map(Result::ok) {
            let in_node_modules = path
                .strip_prefix(root)
                .map(|rel| rel.components().any(|c| c.as_os_str() == "node_modules"))
                .unwrap_or(false);
            if !in_node_modules {
                paths.insert(path);
            }
        }
    }

    paths.iter().map(|path| Manifest::load(path)).collect()
}

/// Find internal dependency declarations for the package in `package_dir`.
///
/// Returns an empty table when the package is not inside a workspace or has
/// no internal scope.
pub fn resolve_path_mappings(
    package_dir: &Path,
    manifest: &Manifest,
    internal_scope: Option<&str>,
) -> PathMappingTable {
    let Some(scope) = internal_scope else {
        return PathMappingTable::new();
    };
    match Workspace::discover(package_dir) {
        Some(workspace) => workspace.path_mappings(package_dir, manifest, scope),
        None => {
            tracing::debug!("{} is not inside a workspace", package_dir.display());
            PathMappingTable::new()
        }
    }
}

/// Ordered module specifier to candidate path table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMappingTable {
    entries: Vec<(String, Vec<String>)>,
}

impl PathMappingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        PathMappingTable {
            entries: Vec::new(),
        }
    }

    /// Append a candidate path for `specifier`, ignoring duplicates.
    pub fn insert(&mut self, specifier: String, path: String) {
        match self.entries.iter_mut().find(|(key, _)| *key == specifier) {
            Some((_, paths)) => {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
            None => self.entries.push((specifier, vec![path])),
        }
    }

    /// Candidate paths for a specifier.
    pub fn get(&self, specifier: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == specifier)
            .map(|(_, paths)| paths.as_slice())
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of specifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Specifiers in insertion order.
    pub fn specifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Render as a compiler `paths` object.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, paths) in &self.entries {
            map.insert(
                key.clone(),
                Value::Array(paths.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Object(map)
    }
}
