//! Global context for pkgsmith operations.
//!
//! The working directory and environment are captured once at startup and
//! threaded through every operation, so nothing below the binary reads
//! process-global state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::MANIFEST_NAME;

/// Global context containing the package directory and environment.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory of the package being built
    cwd: PathBuf,

    /// Environment variables visible to the orchestrator
    env: HashMap<String, String>,
}

impl GlobalContext {
    /// Capture the process working directory and environment.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext {
            cwd,
            env: std::env::vars().collect(),
        })
    }

    /// Create a context rooted at `cwd` with an empty environment.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        GlobalContext {
            cwd: cwd.into(),
            env: HashMap::new(),
        }
    }

    /// Replace the working directory, resolving relative paths against the current one.
    pub fn chdir(mut self, dir: &Path) -> Self {
        self.cwd = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.cwd.join(dir)
        };
        self
    }

    /// Set an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Get the package directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Look up an environment variable.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Path of the package manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.cwd.join(MANIFEST_NAME)
    }
}
