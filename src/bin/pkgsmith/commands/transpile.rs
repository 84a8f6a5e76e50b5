//! `pkgsmith transpile` command

use std::time::Instant;

use anyhow::Result;

use pkgsmith::ops;
use pkgsmith::util::{GlobalContext, SystemRunner};

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let start = Instant::now();
    ops::transpile(ctx, &SystemRunner)?;

    eprintln!(
        "    Finished transpile in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
