//! High-level operations.
//!
//! This module contains the implementation of pkgsmith commands.

pub mod pkgsmith_build;
pub mod pkgsmith_dev;
pub mod pkgsmith_prebuild;
pub mod pkgsmith_transpile;
pub mod pkgsmith_types;

pub use pkgsmith_build::build;
pub use pkgsmith_dev::dev;
pub use pkgsmith_prebuild::{prebuild, prebuild_package};
pub use pkgsmith_transpile::{transpile, transpile_package};
pub use pkgsmith_types::{types, types_package};
