//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// pkgsmith - multi-target builds for TypeScript library packages
#[derive(Parser)]
#[command(name = "pkgsmith")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in <DIR>
    #[arg(short = 'C', long = "cwd", value_name = "DIR", global = true)]
    pub cwd: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite the export maps in package.json
    Prebuild,

    /// Bundle every enabled target
    Transpile,

    /// Emit type declarations
    Types,

    /// Bundle every enabled target in watch mode
    Dev,

    /// Prebuild, transpile and emit type declarations
    Build,
}
