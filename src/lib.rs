//! pkgsmith - multi-target builds for TypeScript library packages
//!
//! This crate provides the library behind the `pkgsmith` binary: config
//! normalization, entry resolution, export map synthesis, workspace path
//! mappings and the bundler and declaration compiler runs.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for pkgsmith unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted process runner and package
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{entry::Entry, manifest::Manifest, package::Package, workspace::Workspace};
pub use util::context::GlobalContext;
