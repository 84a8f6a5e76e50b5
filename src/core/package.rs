//! The package being built.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::entry::Entry;
use crate::core::manifest::Manifest;
use crate::util::config::{load_user_config, BuildConfig};
use crate::util::fs::resolve_entries;
use crate::util::GlobalContext;

/// A package with its normalized configuration and resolved entries.
///
/// Loaded fresh on every invocation; nothing is cached between runs.
#[derive(Debug, Clone)]
pub struct Package {
    dir: PathBuf,
    manifest: Manifest,
    config: BuildConfig,
    entries: Vec<Entry>,
}

impl Package {
    /// Load the package in the context's working directory.
    pub fn load(ctx: &GlobalContext) -> Result<Self> {
        let dir = ctx.cwd().to_path_buf();
        let manifest = Manifest::load(&ctx.manifest_path())?;
        let user = load_user_config(&dir)?.unwrap_or_default();
        let config = BuildConfig::normalize(&user, &manifest, &dir);

        let entries: Vec<Entry> = resolve_entries(&dir, &config.entry_patterns)?
            .into_iter()
            .map(Entry::new)
            .collect();

        if entries.is_empty() {
            tracing::warn!("no entry files matched {:?}", config.entry_patterns);
        } else {
            tracing::debug!("resolved {} entries", entries.len());
        }

        Ok(Package {
            dir,
            manifest,
            config,
            entries,
        })
    }

    /// Package directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Package name, or the directory name when the manifest has none.
    pub fn name(&self) -> String {
        match self.manifest.name() {
            Some(name) => name.to_string(),
            None => self
                .dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// The package manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Mutable access to the manifest, for rewriting.
    pub fn manifest_mut(&mut self) -> &mut Manifest {
        &mut self.manifest
    }

    /// Normalized build configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Resolved entries, sorted by path.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}
