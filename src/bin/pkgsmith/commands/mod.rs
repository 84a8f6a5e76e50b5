//! Command implementations

pub mod build;
pub mod dev;
pub mod prebuild;
pub mod transpile;
pub mod types;
