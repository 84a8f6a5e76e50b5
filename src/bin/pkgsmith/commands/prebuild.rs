//! `pkgsmith prebuild` command

use anyhow::Result;

use pkgsmith::core::MANIFEST_NAME;
use pkgsmith::ops;
use pkgsmith::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let maps = ops::prebuild(ctx)?;

    eprintln!(
        "     Updated {} ({} exports)",
        MANIFEST_NAME,
        maps.publish().len()
    );
    Ok(())
}
