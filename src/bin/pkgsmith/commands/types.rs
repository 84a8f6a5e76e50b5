//! `pkgsmith types` command

use std::time::Instant;

use anyhow::Result;

use pkgsmith::ops;
use pkgsmith::util::{GlobalContext, SystemRunner};

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let start = Instant::now();
    ops::types(ctx, &SystemRunner)?;

    eprintln!(
        "    Finished declarations in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
