//! Build configuration loading and normalization.
//!
//! A package may carry a `pkgsmith.toml` next to its `package.json`. The file
//! is optional; every field falls back to a default inferred from the package
//! kind, the manifest, and the sources themselves.
//!
//! ```toml
//! kind = "shared"            # frontend-react | backend | cli | shared
//! external = ["react"]
//! entry = ["src/**/*.ts", "!src/**/*.test.ts"]
//! tsconfig = "tsconfig.lib.json"
//!
//! [targets]
//! primary = true
//! browser = false
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::manifest::{DependencyKind, Manifest};
use crate::core::target::EnabledTargets;
use crate::util::scan::scan_runtime_only_imports;

/// File name of the optional build configuration.
pub const CONFIG_FILE_NAME: &str = "pkgsmith.toml";

/// Default directory holding a package's sources.
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Type-check base file preferred when present.
pub const BUILD_TSCONFIG: &str = "tsconfig.build.json";

/// Type-check base file used when nothing else is configured.
pub const BASE_TSCONFIG: &str = "tsconfig.json";

/// Errors loading the user configuration. These are always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// What kind of package is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageKind {
    /// React UI code, browser only
    FrontendReact,
    /// Server code
    Backend,
    /// Command-line tools
    Cli,
    /// Code meant to run anywhere
    Shared,
}

impl PackageKind {
    /// Whether this kind targets server runtimes only.
    pub fn is_backend(&self) -> bool {
        matches!(self, PackageKind::Backend | PackageKind::Cli)
    }
}

/// Legacy `platform` field, superseded by `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyPlatform {
    Browser,
    Node,
    Neutral,
}

/// Per-target switches written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetOverrides {
    pub primary: Option<bool>,
    pub compat: Option<bool>,
    #[serde(alias = "browserTarget")]
    pub browser: Option<bool>,
}

/// Configuration exactly as written in `pkgsmith.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct UserConfig {
    pub kind: Option<PackageKind>,
    pub platform: Option<LegacyPlatform>,
    pub targets: TargetOverrides,
    pub external: Vec<String>,
    pub entry: Vec<String>,
    pub tsconfig: Option<PathBuf>,
    pub internal_scope: Option<String>,
    pub source_root: Option<String>,
}

impl UserConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load the user configuration from `dir`, if one exists.
pub fn load_user_config(dir: &Path) -> Result<Option<UserConfig>, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    UserConfig::load(&path).map(Some)
}

/// Fully resolved build configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub kind: PackageKind,
    pub targets: EnabledTargets,
    pub external: Vec<String>,
    pub entry_patterns: Vec<String>,
    pub tsconfig: PathBuf,
    pub internal_scope: Option<String>,
    pub source_root: String,
}

impl BuildConfig {
    /// Merge the user configuration with defaults inferred from the package.
    pub fn normalize(user: &UserConfig, manifest: &Manifest, package_dir: &Path) -> BuildConfig {
        let kind = infer_kind(user);
        let source_root = user
            .source_root
            .clone()
            .unwrap_or_else(|| DEFAULT_SOURCE_ROOT.to_string());

        let runtime_only =
            kind == PackageKind::Shared && scan_runtime_only_imports(&package_dir.join(&source_root));
        let targets = infer_targets(kind, &user.targets, runtime_only);

        let entry_patterns = if user.entry.is_empty() {
            default_entry_patterns(&source_root)
        } else {
            user.entry.clone()
        };

        let config = BuildConfig {
            kind,
            targets,
            external: external_modules(manifest, &user.external),
            entry_patterns,
            tsconfig: resolve_tsconfig(user.tsconfig.as_deref(), package_dir),
            internal_scope: user
                .internal_scope
                .clone()
                .or_else(|| manifest.name().and_then(scope_of).map(str::to_string)),
            source_root,
        };

        tracing::debug!(
            "kind {:?}, targets {:?}, tsconfig {}",
            config.kind,
            config.targets,
            config.tsconfig.display()
        );
        config
    }
}

/// Decide the package kind: explicit `kind`, then legacy `platform`, then shared.
pub fn infer_kind(user: &UserConfig) -> PackageKind {
    if let Some(kind) = user.kind {
        return kind;
    }
    match user.platform {
        Some(LegacyPlatform::Browser) => PackageKind::FrontendReact,
        Some(LegacyPlatform::Node) => PackageKind::Backend,
        _ => PackageKind::Shared,
    }
}

/// Decide which runtime targets to build.
///
/// `runtime_only` reports that a shared package imports server built-ins,
/// which rules out the browser build.
pub fn infer_targets(
    kind: PackageKind,
    overrides: &TargetOverrides,
    runtime_only: bool,
) -> EnabledTargets {
    let (mut compat, mut browser) = match kind {
        PackageKind::FrontendReact => (false, true),
        k if k.is_backend() => (true, false),
        _ => (true, true),
    };
    if runtime_only {
        compat = true;
        browser = false;
    }

    let mut targets = EnabledTargets {
        primary: overrides.primary.unwrap_or(false),
        compat: overrides.compat.unwrap_or(compat),
        browser: overrides.browser.unwrap_or(browser),
    };

    if !targets.any() {
        targets.compat = true;
    }
    targets
}

/// Default entry patterns: every TypeScript source minus tests and stories.
pub fn default_entry_patterns(source_root: &str) -> Vec<String> {
    vec![
        format!("{}/**/*.ts", source_root),
        format!("{}/**/*.tsx", source_root),
        "!**/*.d.ts".to_string(),
        "!**/*.test.*".to_string(),
        "!**/*.spec.*".to_string(),
        "!**/*.stories.*".to_string(),
        "!**/__tests__/**".to_string(),
    ]
}

/// Runtime and peer dependencies plus user externals, first occurrence wins.
fn external_modules(manifest: &Manifest, extra: &[String]) -> Vec<String> {
    let mut external: Vec<String> = Vec::new();
    let declared = manifest.dependency_names(&[DependencyKind::Normal, DependencyKind::Peer]);
    for name in declared.into_iter().chain(extra.iter().map(String::as_str)) {
        if !external.iter().any(|e| e == name) {
            external.push(name.to_string());
        }
    }
    external
}

fn resolve_tsconfig(explicit: Option<&Path>, package_dir: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return package_dir.join(path);
    }
    let build = package_dir.join(BUILD_TSCONFIG);
    if build.is_file() {
        build
    } else {
        package_dir.join(BASE_TSCONFIG)
    }
}

/// `@acme/ui` has scope `@acme/`.
fn scope_of(name: &str) -> Option<&str> {
    if !name.starts_with('@') {
        return None;
    }
    name.find('/').map(|i| &name[..=i])
}
