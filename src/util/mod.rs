//! Shared utilities

pub mod config;
pub mod context;
pub mod fs;
pub mod process;
pub mod scan;

pub use config::{BuildConfig, UserConfig};
pub use context::GlobalContext;
pub use process::{ProcessBuilder, ProcessRunner, SystemRunner};
