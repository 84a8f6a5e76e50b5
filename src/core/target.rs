//! Runtime targets - which consumers get a build.
//!
//! Most entries carry no platform suffix and are built for every target.
//! Suffixed entries are kept away from the targets that cannot run them.

use std::fmt;

use crate::core::entry::{Entry, SuffixToken};

/// Output root for declarations and the lead compiled target.
pub const OUT_DIR: &str = "dist";

/// A runtime a package can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuntimeTarget {
    /// ES modules for Node and bundlers
    Primary,
    /// CommonJS for Node
    Compat,
    /// ES modules for browsers
    Browser,
}

impl RuntimeTarget {
    /// All targets in build order.
    pub const ALL: [RuntimeTarget; 3] = [
        RuntimeTarget::Primary,
        RuntimeTarget::Compat,
        RuntimeTarget::Browser,
    ];

    /// Short name used in logs and output directories.
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeTarget::Primary => "primary",
            RuntimeTarget::Compat => "compat",
            RuntimeTarget::Browser => "browser",
        }
    }

    /// Export condition this target is published under.
    pub fn condition(&self) -> &'static str {
        match self {
            RuntimeTarget::Primary => "import",
            RuntimeTarget::Compat => "require",
            RuntimeTarget::Browser => "browser",
        }
    }

    /// Module format handed to the transpiler.
    pub fn format(&self) -> &'static str {
        match self {
            RuntimeTarget::Primary | RuntimeTarget::Browser => "esm",
            RuntimeTarget::Compat => "cjs",
        }
    }

    /// Platform handed to the transpiler.
    pub fn platform(&self) -> &'static str {
        match self {
            RuntimeTarget::Primary | RuntimeTarget::Compat => "node",
            RuntimeTarget::Browser => "browser",
        }
    }

    /// Suffixes that mark an entry as built for this target only.
    pub fn own_suffixes(&self) -> &'static [SuffixToken] {
        match self {
            RuntimeTarget::Primary => &[SuffixToken::Esm],
            RuntimeTarget::Compat => &[SuffixToken::Node],
            RuntimeTarget::Browser => &[SuffixToken::Browser, SuffixToken::Web],
        }
    }

    /// Suffixes this target never builds.
    pub fn excluded_suffixes(&self) -> &'static [SuffixToken] {
        match self {
            RuntimeTarget::Primary => &[SuffixToken::Native],
            RuntimeTarget::Compat => &[SuffixToken::Browser, SuffixToken::Web],
            RuntimeTarget::Browser => &[SuffixToken::Node, SuffixToken::Esm],
        }
    }

    /// Whether an entry with this suffix may be built for this target.
    pub fn admits(&self, suffix: Option<SuffixToken>) -> bool {
        match suffix {
            Some(token) => !self.excluded_suffixes().contains(&token),
            None => true,
        }
    }
}

impl fmt::Display for RuntimeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which targets a package builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnabledTargets {
    pub primary: bool,
    pub compat: bool,
    pub browser: bool,
}

impl EnabledTargets {
    /// Check whether a target is enabled.
    pub fn is_enabled(&self, target: RuntimeTarget) -> bool {
        match target {
            RuntimeTarget::Primary => self.primary,
            RuntimeTarget::Compat => self.compat,
            RuntimeTarget::Browser => self.browser,
        }
    }

    /// Enabled targets in build order.
    pub fn iter(&self) -> impl Iterator<Item = RuntimeTarget> + '_ {
        RuntimeTarget::ALL
            .into_iter()
            .filter(|t| self.is_enabled(*t))
    }

    /// Whether any target is enabled.
    pub fn any(&self) -> bool {
        self.primary || self.compat || self.browser
    }

    /// Output directory for a target, relative to the package.
    ///
    /// The lead target (primary, or compat when primary is off) shares the
    /// declaration directory; the others get their own subdirectory.
    pub fn output_dir(&self, target: RuntimeTarget) -> String {
        match target {
            RuntimeTarget::Primary => OUT_DIR.to_string(),
            RuntimeTarget::Compat if !self.primary => OUT_DIR.to_string(),
            _ => format!("{}/{}", OUT_DIR, target.name()),
        }
    }
}

/// Entries that may be built for `target`.
pub fn select_entries_for_target(entries: &[Entry], target: RuntimeTarget) -> Vec<&Entry> {
    entries
        .iter()
        .filter(|e| target.admits(e.suffix()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(paths: &[&str]) -> Vec<Entry> {
        paths.iter().map(|p| Entry::new(*p)).collect()
    }

    fn selected(entries: &[Entry], target: RuntimeTarget) -> Vec<&str> {
        select_entries_for_target(entries, target)
            .into_iter()
            .map(Entry::path)
            .collect()
    }

    #[test]
    fn test_selection_is_asymmetric() {
        let all = entries(&[
            "src/a.ts",
            "src/a.browser.ts",
            "src/a.web.ts",
            "src/a.node.ts",
            "src/a.esm.ts",
            "src/a.native.ts",
        ]);

        assert_eq!(
            selected(&all, RuntimeTarget::Compat),
            vec!["src/a.ts", "src/a.node.ts", "src/a.esm.ts", "src/a.native.ts"]
        );
        assert_eq!(
            selected(&all, RuntimeTarget::Browser),
            vec!["src/a.ts", "src/a.browser.ts", "src/a.web.ts", "src/a.native.ts"]
        );
        assert_eq!(
            selected(&all, RuntimeTarget::Primary),
            vec![
                "src/a.ts",
                "src/a.browser.ts",
                "src/a.web.ts",
                "src/a.node.ts",
                "src/a.esm.ts"
            ]
        );
    }

    #[test]
    fn test_unsuffixed_entries_go_everywhere() {
        let all = entries(&["src/index.ts", "src/utils/format.ts"]);
        for target in RuntimeTarget::ALL {
            assert_eq!(select_entries_for_target(&all, target).len(), 2);
        }
    }

    #[test]
    fn test_enabled_targets_iter() {
        let targets = EnabledTargets {
            primary: false,
            compat: true,
            browser: true,
        };
        let list: Vec<_> = targets.iter().collect();
        assert_eq!(list, vec![RuntimeTarget::Compat, RuntimeTarget::Browser]);
        assert!(targets.any());
        assert!(!EnabledTargets::default().any());
    }

    #[test]
    fn test_output_dirs() {
        let compat_only = EnabledTargets {
            primary: false,
            compat: true,
            browser: true,
        };
        assert_eq!(compat_only.output_dir(RuntimeTarget::Compat), "dist");
        assert_eq!(compat_only.output_dir(RuntimeTarget::Browser), "dist/browser");

        let with_primary = EnabledTargets {
            primary: true,
            compat: true,
            browser: false,
        };
        assert_eq!(with_primary.output_dir(RuntimeTarget::Primary), "dist");
        assert_eq!(with_primary.output_dir(RuntimeTarget::Compat), "dist/compat");
    }
}
