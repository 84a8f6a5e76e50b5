//! Build plans - how entries group into exports and what each target compiles.
//!
//! Entries are grouped by export key. Within a group each platform suffix
//! holds at most one entry, and every consumer (dev map, publish map, a
//! target's compile job) picks from the group with a fixed priority list.

use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::core::entry::{infer_build_root, strip_build_root, Entry, SuffixToken};
use crate::core::target::{select_entries_for_target, EnabledTargets, RuntimeTarget, OUT_DIR};
use crate::core::Package;

/// Variant priority when no particular target is asked for.
const DEFAULT_PRIORITY: [Option<SuffixToken>; 5] = [
    None,
    Some(SuffixToken::Esm),
    Some(SuffixToken::Node),
    Some(SuffixToken::Browser),
    Some(SuffixToken::Web),
];

/// Entries sharing an export key, one per platform suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantGroup {
    variants: BTreeMap<Option<SuffixToken>, Entry>,
}

impl VariantGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        VariantGroup {
            variants: BTreeMap::new(),
        }
    }

    /// Add an entry under its suffix. Returns false if the slot was taken.
    pub fn insert(&mut self, entry: &Entry) -> bool {
        match self.variants.entry(entry.suffix()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry.clone());
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Entry for a suffix (`None` for the base entry).
    pub fn get(&self, suffix: Option<SuffixToken>) -> Option<&Entry> {
        self.variants.get(&suffix)
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Check if the group has no variants.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// The variant used when no target is specified.
    ///
    /// Base first, then primary, compat and browser variants, then anything left.
    pub fn select_default(&self) -> Option<&Entry> {
        DEFAULT_PRIORITY
            .iter()
            .find_map(|suffix| self.variants.get(suffix))
            .or_else(|| self.variants.values().next())
    }

    /// The variant compiled for `target`.
    ///
    /// The target's own variants come first, then the base entry, then any
    /// other variant the target admits, in suffix order.
    pub fn select_for_target(&self, target: RuntimeTarget) -> Option<&Entry> {
        let own = target.own_suffixes();
        let fallback = SuffixToken::ALL
            .into_iter()
            .filter(|token| !own.contains(token) && target.admits(Some(*token)));

        own.iter()
            .copied()
            .map(Some)
            .chain(std::iter::once(None))
            .chain(fallback.map(Some))
            .find_map(|suffix| self.variants.get(&suffix))
    }
}

/// A named entry point handed to the transpiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Output name, relative to the target's output directory, no extension
    pub name: String,
    /// Source path, relative to the package
    pub source: String,
}

/// Everything derived from a package's entries and enabled targets.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    entries: Vec<Entry>,
    targets: EnabledTargets,
    groups: Vec<(String, VariantGroup)>,
    types_root: String,
    target_roots: BTreeMap<RuntimeTarget, String>,
}

impl BuildPlan {
    /// Group entries into export slots and infer build roots.
    pub fn new(entries: &[Entry], targets: EnabledTargets, source_root: &str) -> Self {
        let mut groups: BTreeMap<String, VariantGroup> = BTreeMap::new();

        for entry in entries {
            let canonical = entry.canonical_key(source_root);
            let exact = entry.exact_key(source_root);
            groups.entry(canonical).or_default().insert(entry);
            groups.entry(exact).or_default().insert(entry);
        }

        if let [only] = entries {
            if !groups.contains_key(".") {
                groups.entry(".".to_string()).or_default().insert(only);
            }
        }

        let mut groups: Vec<_> = groups.into_iter().collect();
        groups.sort_by(|a, b| compare_export_keys(&a.0, &b.0));

        let types_root = infer_build_root(entries.iter().map(Entry::path));
        let target_roots = targets
            .iter()
            .map(|target| {
                let selected = select_entries_for_target(entries, target);
                (target, infer_build_root(selected.into_iter().map(Entry::path)))
            })
            .collect();

        BuildPlan {
            entries: entries.to_vec(),
            targets,
            groups,
            types_root,
            target_roots,
        }
    }

    /// Plan the build of a loaded package.
    pub fn for_package(package: &Package) -> Self {
        let config = package.config();
        BuildPlan::new(package.entries(), config.targets, &config.source_root)
    }

    /// All entries, sorted by path.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Enabled targets.
    pub fn targets(&self) -> EnabledTargets {
        self.targets
    }

    /// Variant groups, `"."` first and the rest in key order.
    pub fn groups(&self) -> &[(String, VariantGroup)] {
        &self.groups
    }

    /// Look up a group by export key.
    pub fn group(&self, key: &str) -> Option<&VariantGroup> {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, group)| group)
    }

    /// Build root for declarations: common directory of all entries.
    pub fn types_root(&self) -> &str {
        &self.types_root
    }

    /// Build root for a target: common directory of its selected entries.
    pub fn build_root(&self, target: RuntimeTarget) -> &str {
        self.target_roots
            .get(&target)
            .map(String::as_str)
            .unwrap_or(".")
    }

    /// Output directory of a target, relative to the package.
    pub fn output_dir(&self, target: RuntimeTarget) -> String {
        self.targets.output_dir(target)
    }

    /// Compiled output name of an entry for a target, without extension.
    pub fn output_name(&self, entry: &Entry, target: RuntimeTarget) -> String {
        strip_build_root(entry.unsuffixed_stem(), self.build_root(target)).to_string()
    }

    /// Manifest path of an entry's compiled output for a target.
    pub fn output_path(&self, entry: &Entry, target: RuntimeTarget) -> String {
        format!(
            "./{}/{}.js",
            self.output_dir(target),
            self.output_name(entry, target)
        )
    }

    /// Manifest path of an entry's declaration file.
    pub fn types_path(&self, entry: &Entry) -> String {
        format!(
            "./{}/{}.d.ts",
            OUT_DIR,
            strip_build_root(entry.stem(), &self.types_root)
        )
    }

    /// Named entry points compiled for a target, unique by output name.
    pub fn entry_points(&self, target: RuntimeTarget) -> Vec<EntryPoint> {
        if !self.targets.is_enabled(target) {
            return Vec::new();
        }

        let mut points: Vec<EntryPoint> = Vec::new();
        for (_, group) in &self.groups {
            let Some(entry) = group.select_for_target(target) else {
                continue;
            };
            let name = self.output_name(entry, target);
            if points.iter().any(|p| p.name == name) {
                continue;
            }
            points.push(EntryPoint {
                name,
                source: entry.path().to_string(),
            });
        }
        points
    }
}

/// Export key order: `"."` first, everything else lexicographic.
pub fn compare_export_keys(a: &str, b: &str) -> Ordering {
    match (a == ".", b == ".") {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}
