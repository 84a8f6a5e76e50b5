//! Test fixtures for common test scenarios.
//!
//! This module provides on-disk packages and workspaces for tests that
//! exercise manifest loading, entry resolution and path mappings.

use std::path::Path;

use tempfile::TempDir;

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(&path, contents).expect("failed to write file");
}

/// Create a temporary package directory holding a `package.json`.
///
/// Returns the TempDir handle - dropping it will clean up the directory.
pub fn create_test_package(manifest: &str) -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    write_file(tmp.path(), "package.json", manifest);
    tmp
}

/// Fixture for a workspace member package.
#[derive(Debug, Clone)]
pub struct MemberFixture {
    /// Directory relative to the workspace root.
    pub dir: String,
    /// package.json content.
    pub manifest: String,
    /// Source files (path relative to the member -> content).
    pub files: Vec<(String, String)>,
}

impl MemberFixture {
    /// Create a member with the given name under `dir`.
    pub fn new(dir: &str, name: &str) -> Self {
        MemberFixture {
            dir: dir.to_string(),
            manifest: format!(r#"{{"name": "{}", "version": "0.1.0"}}"#, name),
            files: Vec::new(),
        }
    }

    /// Replace the manifest.
    pub fn with_manifest(mut self, manifest: &str) -> Self {
        self.manifest = manifest.to_string();
        self
    }

    /// Add a file to the member.
    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.push((path.to_string(), contents.to_string()));
        self
    }
}

/// Create a temporary workspace root with the given members.
pub fn create_test_workspace(members: &[MemberFixture]) -> TempDir {
    let tmp = create_test_package(r#"{"name": "root", "private": true, "workspaces": ["packages/*"]}"#);
    for member in members {
        let dir = tmp.path().join(&member.dir);
        write_file(&dir, "package.json", &member.manifest);
        for (path, contents) in &member.files {
            write_file(&dir, path, contents);
        }
    }
    tmp
}

/// A workspace where `packages/ui` depends on `packages/theme`.
pub fn ui_theme_workspace() -> TempDir {
    create_test_workspace(&[
        MemberFixture::new("packages/theme", "@acme/theme")
            .with_manifest(
                r#"{
  "name": "@acme/theme",
  "version": "0.1.0",
  "types": "./dist/index.d.ts",
  "publishConfig": {
    "exports": {
      ".": {"types": "./dist/index.d.ts", "require": "./dist/index.js"},
      "./tokens": {"types": "./dist/tokens/colors.d.ts"}
    }
  }
}"#,
            )
            .with_file("src/index.ts", "export const theme = {};\n"),
        MemberFixture::new("packages/ui", "@acme/ui")
            .with_manifest(
                r#"{
  "name": "@acme/ui",
  "version": "0.1.0",
  "dependencies": {"@acme/theme": "workspace:*", "react": "^18.0.0"}
}"#,
            )
            .with_file("src/index.ts", "export * from './button';\n")
            .with_file("src/button.tsx", "export const Button = () => null;\n")
            .with_file("src/button.browser.tsx", "export const Button = () => null;\n")
            .with_file("tsconfig.json", "{}\n"),
    ])
}
