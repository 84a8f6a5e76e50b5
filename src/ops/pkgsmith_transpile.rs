//! Implementation of `pkgsmith transpile`.

use anyhow::Result;

use crate::builder::errors::ensure_success;
use crate::builder::transpile::TRANSPILER;
use crate::builder::{BuildPlan, TranspileJob};
use crate::core::Package;
use crate::util::process::{find_node_tool, ProcessRunner};
use crate::util::GlobalContext;

/// Bundle every enabled target of the package in `ctx`, one after another.
pub fn transpile(ctx: &GlobalContext, runner: &dyn ProcessRunner) -> Result<()> {
    let package = Package::load(ctx)?;
    transpile_package(&package, runner)
}

/// Bundle every enabled target of a loaded package.
///
/// Targets run in build order and the first failing one stops the rest.
pub fn transpile_package(package: &Package, runner: &dyn ProcessRunner) -> Result<()> {
    let plan = BuildPlan::for_package(package);
    let jobs = TranspileJob::for_plan(&plan, &package.config().external, false);
    if jobs.is_empty() {
        tracing::warn!("nothing to transpile for {}", package.name());
        return Ok(());
    }

    let program = find_node_tool(package.dir(), TRANSPILER);
    for job in &jobs {
        tracing::info!(
            "transpiling {} entries for {} into {}",
            job.entry_points().len(),
            job.target(),
            job.out_dir()
        );
        let cmd = job.command(&program, package.dir());
        let exit = runner.run(&cmd)?;
        ensure_success(&cmd, exit)?;
    }
    Ok(())
}
