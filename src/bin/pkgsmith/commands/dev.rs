//! `pkgsmith dev` command

use anyhow::Result;

use pkgsmith::ops;
use pkgsmith::util::{GlobalContext, SystemRunner};

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    // Blocks until every watcher exits.
    ops::dev(ctx, &SystemRunner)
}
