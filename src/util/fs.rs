//! Filesystem utilities.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};

/// Glob options shared by inclusion and exclusion patterns.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Expand entry patterns into sorted, deduplicated paths relative to `root`.
///
/// Patterns starting with `!` are exclusions. They are applied to every
/// inclusion match, regardless of which inclusion pattern produced it.
/// Returned paths always use `/` as the separator.
pub fn resolve_entries(root: &Path, patterns: &[String]) -> Result<Vec<String>> {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();

    for pattern in patterns {
        if let Some(exclude) = pattern.strip_prefix('!') {
            excludes.push(
                Pattern::new(exclude)
                    .with_context(|| format!("invalid glob pattern: {}", pattern))?,
            );
        } else {
            includes.push(pattern.as_str());
        }
    }

    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let mut results = BTreeSet::new();

    for pattern in includes {
        let full_pattern = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);

        for entry in glob_with(&full_pattern, MATCH_OPTIONS)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }

            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let relative = to_slash(relative);

            if excludes
                .iter()
                .any(|p| p.matches_with(&relative, MATCH_OPTIONS))
            {
                continue;
            }
            results.insert(relative);
        }
    }

    Ok(results.into_iter().collect())
}

/// Render a path with `/` separators, dropping `.` components.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Relative path from `base` to `path` in `./`-or-`../`-prefixed slash form.
pub fn relative_slash_path(base: &Path, path: &Path) -> String {
    let relative = to_slash(&relative_path(base, path));
    if relative.is_empty() {
        ".".to_string()
    } else if relative.starts_with("../") || relative == ".." || relative.starts_with('/') {
        relative
    } else {
        format!("./{}", relative)
    }
}

/// Search `start` and its ancestors for `relative`, returning the first hit.
pub fn find_upward(start: &Path, relative: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
}
