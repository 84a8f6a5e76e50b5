//! Implementation of `pkgsmith build`.

use anyhow::Result;

use crate::core::Package;
use crate::ops::pkgsmith_prebuild::prebuild_package;
use crate::ops::pkgsmith_transpile::transpile_package;
use crate::ops::pkgsmith_types::types_package;
use crate::util::process::ProcessRunner;
use crate::util::GlobalContext;

/// Rewrite the manifest, bundle every target, then emit declarations.
pub fn build(ctx: &GlobalContext, runner: &dyn ProcessRunner) -> Result<()> {
    let mut package = Package::load(ctx)?;

    prebuild_package(&mut package)?;
    transpile_package(&package, runner)?;
    types_package(ctx, &package, runner)?;

    tracing::info!("built {}", package.name());
    Ok(())
}
