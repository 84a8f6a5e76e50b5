//! Source entries and the naming conventions derived from their paths.
//!
//! An entry such as `src/forms/input.browser.tsx` carries:
//! - its stem without extension: `src/forms/input.browser`
//! - an optional platform suffix token: `browser`
//! - its stem without suffix: `src/forms/input`
//! - the export keys it is reachable under: `./forms/input`

use std::fmt;

/// Trailing filename markers that restrict an entry to some runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuffixToken {
    /// Browser only
    Browser,
    /// React Native only
    Native,
    /// Node (compat) only
    Node,
    /// Web only, treated like browser
    Web,
    /// Primary (ES module) only
    Esm,
}

impl SuffixToken {
    /// All tokens in the order they are tried when stripping.
    pub const ALL: [SuffixToken; 5] = [
        SuffixToken::Browser,
        SuffixToken::Native,
        SuffixToken::Node,
        SuffixToken::Web,
        SuffixToken::Esm,
    ];

    /// The marker as it appears in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuffixToken::Browser => "browser",
            SuffixToken::Native => "native",
            SuffixToken::Node => "node",
            SuffixToken::Web => "web",
            SuffixToken::Esm => "esm",
        }
    }
}

impl fmt::Display for SuffixToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source file selected as a build entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entry {
    path: String,
    stem_len: usize,
    unsuffixed_len: usize,
    suffix: Option<SuffixToken>,
}

impl Entry {
    /// Create an entry from a `/`-separated path relative to the package.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let stem = strip_extension(&path);
        let (unsuffixed, suffix) = strip_suffix(stem);

        Entry {
            stem_len: stem.len(),
            unsuffixed_len: unsuffixed.len(),
            suffix,
            path,
        }
    }

    /// The path as resolved.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path without its extension.
    pub fn stem(&self) -> &str {
        &self.path[..self.stem_len]
    }

    /// Path without extension and platform suffix.
    pub fn unsuffixed_stem(&self) -> &str {
        &self.path[..self.unsuffixed_len]
    }

    /// Platform suffix, `None` for base entries.
    pub fn suffix(&self) -> Option<SuffixToken> {
        self.suffix
    }

    /// Public export key: source root dropped, `index` collapsed to its directory.
    pub fn canonical_key(&self, source_root: &str) -> String {
        export_key(self.unsuffixed_stem(), source_root, true)
    }

    /// Export key that keeps a trailing `/index` segment addressable.
    ///
    /// Built from the unsuffixed stem, so `forms/index.browser.ts` and
    /// `forms/index.ts` share `./forms/index` and stay in one variant group.
    /// Only the root `index` collapses, to `"."`.
    pub fn exact_key(&self, source_root: &str) -> String {
        export_key(self.unsuffixed_stem(), source_root, false)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Strip the last extension of the file name, if any.
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Strip one trailing `.<token>` from a stem.
fn strip_suffix(stem: &str) -> (&str, Option<SuffixToken>) {
    let name_start = stem.rfind('/').map_or(0, |i| i + 1);
    let name = &stem[name_start..];

    for token in SuffixToken::ALL {
        if let Some(rest) = name.strip_suffix(token.as_str()) {
            if let Some(base) = rest.strip_suffix('.') {
                if !base.is_empty() {
                    return (&stem[..name_start + base.len()], Some(token));
                }
            }
        }
    }
    (stem, None)
}

fn export_key(stem: &str, source_root: &str, collapse_index: bool) -> String {
    let relative = stem
        .strip_prefix(source_root)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(stem);

    if relative == "index" {
        return ".".to_string();
    }
    if collapse_index {
        if let Some(dir) = relative.strip_suffix("/index") {
            return format!("./{}", dir);
        }
    }
    format!("./{}", relative)
}

/// Longest common directory prefix of the given paths, or `"."`.
pub fn infer_build_root<'a, I>(paths: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut common: Option<Vec<&str>> = None;

    for path in paths {
        let segments: Vec<&str> = match path.rfind('/') {
            Some(i) => path[..i]
                .split('/')
                .filter(|s| !s.is_empty() && *s != ".")
                .collect(),
            None => Vec::new(),
        };

        common = Some(match common {
            None => segments,
            Some(prefix) => prefix
                .into_iter()
                .zip(segments)
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }

    match common {
        Some(segments) if !segments.is_empty() => segments.join("/"),
        _ => ".".to_string(),
    }
}

/// Remove a build root prefix from a path.
pub fn strip_build_root<'a>(path: &'a str, root: &str) -> &'a str {
    if root == "." {
        return path;
    }
    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}
