//! Static scan for imports that only exist on server runtimes.
//!
//! A package that pulls in filesystem, process or networking built-ins
//! cannot ship a working browser build.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

/// File extensions considered source code.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

static RUNTIME_ONLY_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(?:\bfrom\s*|\bimport\s*\(\s*|\brequire\s*\(\s*|^\s*import\s+)["'](?:node:[^"']+|fs|fs/promises|path|os|child_process|net|http|https|http2|tls|dgram|dns|cluster|worker_threads|process|readline|v8|vm)["']"#,
    )
    .expect("runtime-only import pattern is valid")
});

/// Check whether a single source text imports a runtime-only module.
pub fn imports_runtime_only(source: &str) -> bool {
    RUNTIME_ONLY_IMPORT.is_match(source)
}

/// Scan every source file below `source_root` for runtime-only imports.
///
/// Returns false when the directory does not exist. Unreadable files are skipped.
pub fn scan_runtime_only_imports(source_root: &Path) -> bool {
    if !source_root.is_dir() {
        return false;
    }

    for entry in WalkDir::new(source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let is_source = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
        if !is_source {
            continue;
        }

        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        if imports_runtime_only(&contents) {
            tracing::debug!("runtime-only import found in {}", path.display());
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detects_import_forms() {
        assert!(imports_runtime_only("import fs from \"fs\";"));
        assert!(imports_runtime_only("import { readFile } from 'node:fs/promises';"));
        assert!(imports_runtime_only("const cp = require('child_process');"));
        assert!(imports_runtime_only("const os = await import(\"os\");"));
        assert!(imports_runtime_only("export * from 'path';"));
        assert!(imports_runtime_only("import 'node:process';"));
    }

    #[test]
    fn test_ignores_lookalikes() {
        assert!(!imports_runtime_only("import { path } from './path';"));
        assert!(!imports_runtime_only("import fsx from 'fs-extra';"));
        assert!(!imports_runtime_only("import React from 'react';"));
        assert!(!imports_runtime_only("const label = 'fs';"));
    }

    #[test]
    fn test_scan_directory() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("server")).unwrap();
        std::fs::write(src.join("index.ts"), "export const a = 1;\n").unwrap();
        assert!(!scan_runtime_only_imports(&src));

        std::fs::write(
            src.join("server/files.ts"),
            "import { readFileSync } from 'node:fs';\n",
        )
        .unwrap();
        assert!(scan_runtime_only_imports(&src));
    }

    #[test]
    fn test_scan_skips_non_source_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("notes.md"), "import fs from 'fs'\n").unwrap();
        assert!(!scan_runtime_only_imports(tmp.path()));
    }

    #[test]
    fn test_scan_missing_directory() {
        assert!(!scan_runtime_only_imports(Path::new("/definitely/not/here")));
    }
}
