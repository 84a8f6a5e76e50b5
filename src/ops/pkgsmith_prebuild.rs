//! Implementation of `pkgsmith prebuild`.

use anyhow::{Context, Result};

use crate::builder::{BuildPlan, ExportMaps};
use crate::core::Package;
use crate::util::GlobalContext;

/// Rewrite the manifest's export maps for the package in `ctx`.
pub fn prebuild(ctx: &GlobalContext) -> Result<ExportMaps> {
    let mut package = Package::load(ctx)?;
    prebuild_package(&mut package)
}

/// Rewrite the export maps of an already loaded package.
pub fn prebuild_package(package: &mut Package) -> Result<ExportMaps> {
    let plan = BuildPlan::for_package(package);
    let maps = ExportMaps::from_plan(&plan);

    maps.apply(package.manifest_mut());
    package
        .manifest()
        .save()
        .with_context(|| format!("failed to update manifest of `{}`", package.name()))?;

    tracing::info!(
        "wrote {} export(s) for {}",
        maps.publish().len(),
        package.name()
    );
    Ok(maps)
}
