//! Core data structures for pkgsmith.
//!
//! This module contains the foundational types used throughout pkgsmith:
//! - Entries and their platform suffixes
//! - Runtime targets and entry selection
//! - Manifests and the package being built
//! - Workspace discovery and declaration path mappings

pub mod entry;
pub mod manifest;
pub mod package;
pub mod target;
pub mod workspace;

pub use entry::{Entry, SuffixToken};
pub use manifest::{Manifest, MANIFEST_NAME};
pub use package::Package;
pub use target::{EnabledTargets, RuntimeTarget};
pub use workspace::{PathMappingTable, Workspace, WorkspacePackage};
