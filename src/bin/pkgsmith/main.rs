//! pkgsmith CLI - multi-target builds for TypeScript library packages

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use pkgsmith::builder::BuildError;
use pkgsmith::util::GlobalContext;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "PKGSMITH_LOG";

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        let code = e
            .downcast_ref::<BuildError>()
            .map(BuildError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("pkgsmith=debug")
        } else {
            EnvFilter::new("pkgsmith=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    if let Some(dir) = &cli.cwd {
        ctx = ctx.chdir(dir);
    }

    // Execute command
    match cli.command {
        Commands::Prebuild => commands::prebuild::execute(&ctx),
        Commands::Transpile => commands::transpile::execute(&ctx),
        Commands::Types => commands::types::execute(&ctx),
        Commands::Dev => commands::dev::execute(&ctx),
        Commands::Build => commands::build::execute(&ctx),
    }
}
