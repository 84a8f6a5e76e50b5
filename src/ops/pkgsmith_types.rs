//! Implementation of `pkgsmith types`.

use anyhow::Result;

use crate::builder::{BuildPlan, DeclarationJob};
use crate::core::workspace::resolve_path_mappings;
use crate::core::Package;
use crate::util::process::ProcessRunner;
use crate::util::GlobalContext;

/// Emit declarations for the package in `ctx`.
pub fn types(ctx: &GlobalContext, runner: &dyn ProcessRunner) -> Result<()> {
    let package = Package::load(ctx)?;
    types_package(ctx, &package, runner)
}

/// Emit declarations for a loaded package.
///
/// Internal workspace dependencies are mapped onto their declaration output
/// so that they resolve without being published.
pub fn types_package(
    ctx: &GlobalContext,
    package: &Package,
    runner: &dyn ProcessRunner,
) -> Result<()> {
    if package.entries().is_empty() {
        tracing::warn!("no declarations to emit for {}", package.name());
        return Ok(());
    }

    let config = package.config();
    let plan = BuildPlan::for_package(package);
    let paths = resolve_path_mappings(
        package.dir(),
        package.manifest(),
        config.internal_scope.as_deref(),
    );
    if !paths.is_empty() {
        tracing::debug!(
            "mapped internal dependencies: {}",
            paths.specifiers().collect::<Vec<_>>().join(", ")
        );
    }

    DeclarationJob::new(package.dir(), &config.tsconfig, &plan, paths).run(ctx, runner)
}
