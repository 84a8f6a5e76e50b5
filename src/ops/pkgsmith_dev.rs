//! Implementation of `pkgsmith dev`.

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::builder::errors::ensure_success;
use crate::builder::transpile::TRANSPILER;
use crate::builder::{BuildPlan, TranspileJob};
use crate::core::target::RuntimeTarget;
use crate::core::Package;
use crate::util::process::{
    find_node_tool, ProcessBuilder, ProcessExit, ProcessRunner, SubprocessHandle,
};
use crate::util::GlobalContext;

struct Watcher {
    target: RuntimeTarget,
    cmd: ProcessBuilder,
    handle: Box<dyn SubprocessHandle>,
}

/// Run the bundler in watch mode for every enabled target at once.
///
/// Returns when all watchers have exited. A failing watcher does not stop
/// the others; the first failure in build order is reported afterwards.
pub fn dev(ctx: &GlobalContext, runner: &dyn ProcessRunner) -> Result<()> {
    let package = Package::load(ctx)?;
    let plan = BuildPlan::for_package(&package);
    let jobs = TranspileJob::for_plan(&plan, &package.config().external, true);
    if jobs.is_empty() {
        tracing::warn!("nothing to watch for {}", package.name());
        return Ok(());
    }

    let program = find_node_tool(package.dir(), TRANSPILER);
    let mut watchers: Vec<Watcher> = Vec::with_capacity(jobs.len());
    for job in &jobs {
        let cmd = job.command(&program, package.dir());
        let handle = match runner.spawn(&cmd) {
            Ok(handle) => handle,
            Err(e) => {
                stop_watchers(&mut watchers);
                return Err(e);
            }
        };
        tracing::info!("watching {} into {}", job.target(), job.out_dir());
        watchers.push(Watcher {
            target: job.target(),
            cmd,
            handle,
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(watchers.len())
        .build()
        .context("failed to start watcher threads")?;

    let exits: Vec<Result<ProcessExit>> = pool.install(|| {
        watchers
            .par_iter_mut()
            .map(|watcher| watcher.handle.wait())
            .collect()
    });

    for (watcher, exit) in watchers.iter().zip(exits) {
        let exit = exit?;
        tracing::debug!("{} watcher exited with {}", watcher.target, exit);
        ensure_success(&watcher.cmd, exit)?;
    }
    Ok(())
}

/// Kill watchers that already started when a later one cannot be spawned.
fn stop_watchers(watchers: &mut [Watcher]) {
    for watcher in watchers {
        if let Err(e) = watcher.handle.kill() {
            tracing::warn!("failed to stop {} watcher: {:#}", watcher.target, e);
        }
    }
}
