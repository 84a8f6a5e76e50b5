//! Declaration emit through the TypeScript compiler.
//!
//! The compiler only takes its options from a config file, so every run
//! writes a throwaway config next to the package manifest that extends the
//! package's own and narrows it to declaration output. The file is a
//! [`NamedTempFile`] and goes away when the job finishes, whatever the outcome.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use tempfile::NamedTempFile;

use crate::builder::errors::ensure_success;
use crate::builder::plan::BuildPlan;
use crate::core::target::OUT_DIR;
use crate::core::workspace::PathMappingTable;
use crate::util::fs::relative_slash_path;
use crate::util::process::{find_node_tool, ProcessBuilder, ProcessRunner};
use crate::util::GlobalContext;

/// Name of the declaration compiler binary.
pub const DECLARATION_COMPILER: &str = "tsc";

/// Environment variable overriding the compiler's heap limit, in megabytes.
pub const MEMORY_LIMIT_ENV: &str = "PKGSMITH_TYPES_MEMORY_MB";

/// Heap limit used when [`MEMORY_LIMIT_ENV`] is unset or not a number.
pub const DEFAULT_MEMORY_LIMIT_MB: u32 = 8192;

const TEMP_CONFIG_PREFIX: &str = "tsconfig.pkgsmith.";

/// A declaration-only compiler run for one package.
#[derive(Debug, Clone)]
pub struct DeclarationJob {
    package_dir: PathBuf,
    base_tsconfig: PathBuf,
    root_dir: String,
    include: Vec<String>,
    paths: PathMappingTable,
}

impl DeclarationJob {
    pub fn new(
        package_dir: &Path,
        base_tsconfig: &Path,
        plan: &BuildPlan,
        paths: PathMappingTable,
    ) -> Self {
        DeclarationJob {
            package_dir: package_dir.to_path_buf(),
            base_tsconfig: base_tsconfig.to_path_buf(),
            root_dir: plan.types_root().to_string(),
            include: plan.entries().iter().map(|e| e.path().to_string()).collect(),
            paths,
        }
    }

    /// Contents of the temporary compiler config.
    pub fn tsconfig_json(&self) -> Value {
        let mut options = Map::new();
        options.insert("incremental".into(), json!(false));
        options.insert("composite".into(), json!(false));
        options.insert("noEmit".into(), json!(false));
        options.insert("declaration".into(), json!(true));
        options.insert("emitDeclarationOnly".into(), json!(true));
        options.insert("declarationMap".into(), json!(true));
        options.insert("outDir".into(), json!(OUT_DIR));
        options.insert("rootDir".into(), json!(self.root_dir));
        if !self.paths.is_empty() {
            options.insert("baseUrl".into(), json!("."));
            options.insert("paths".into(), self.paths.to_json());
        }

        json!({
            "extends": relative_slash_path(&self.package_dir, &self.base_tsconfig),
            "compilerOptions": options,
            "include": self.include,
        })
    }

    /// Write the temporary config into the package directory.
    pub fn write_tsconfig(&self) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_CONFIG_PREFIX)
            .suffix(".json")
            .tempfile_in(&self.package_dir)
            .with_context(|| {
                format!(
                    "failed to create temporary tsconfig in {}",
                    self.package_dir.display()
                )
            })?;

        let mut contents = serde_json::to_string_pretty(&self.tsconfig_json())?;
        contents.push('\n');
        file.write_all(contents.as_bytes())
            .with_context(|| format!("failed to write {}", file.path().display()))?;
        file.flush()?;

        Ok(file)
    }

    /// Compiler command for a written config.
    pub fn command(&self, program: &Path, config: &Path, memory_limit_mb: u32) -> ProcessBuilder {
        ProcessBuilder::new(program)
            .arg("-p")
            .arg(config)
            .env(
                "NODE_OPTIONS",
                format!("--max-old-space-size={}", memory_limit_mb),
            )
            .cwd(&self.package_dir)
    }

    /// Write the config, run the compiler and remove the config again.
    pub fn run(&self, ctx: &GlobalContext, runner: &dyn ProcessRunner) -> Result<()> {
        let config = self.write_tsconfig()?;
        let program = find_node_tool(&self.package_dir, DECLARATION_COMPILER);
        let cmd = self.command(&program, config.path(), memory_limit_mb(ctx));

        tracing::info!("emitting declarations for {} entries", self.include.len());
        let exit = runner.run(&cmd)?;
        ensure_success(&cmd, exit)?;
        Ok(())
    }
}

/// Compiler heap limit from the environment, or the default.
pub fn memory_limit_mb(ctx: &GlobalContext) -> u32 {
    ctx.env_var(MEMORY_LIMIT_ENV)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_MEMORY_LIMIT_MB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Entry;
    use crate::core::target::EnabledTargets;
    use crate::test_support::MockRunner;
    use tempfile::TempDir;

    fn plan(paths: &[&str]) -> BuildPlan {
        let entries: Vec<Entry> = paths.iter().map(|p| Entry::new(*p)).collect();
        BuildPlan::new(
            &entries,
            EnabledTargets {
                primary: false,
                compat: true,
                browser: false,
            },
            "src",
        )
    }

    fn temp_configs(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with(TEMP_CONFIG_PREFIX)
            })
            .collect()
    }

    #[test]
    fn test_tsconfig_contents() {
        let job = DeclarationJob::new(
            Path::new("/repo/packages/ui"),
            Path::new("/repo/packages/ui/tsconfig.build.json"),
            &plan(&["src/index.ts", "src/forms/index.ts"]),
            PathMappingTable::new(),
        );
        let config = job.tsconfig_json();

        assert_eq!(config["extends"], "./tsconfig.build.json");
        assert_eq!(config["compilerOptions"]["emitDeclarationOnly"], true);
        assert_eq!(config["compilerOptions"]["incremental"], false);
        assert_eq!(config["compilerOptions"]["outDir"], "dist");
        assert_eq!(config["compilerOptions"]["rootDir"], "src");
        assert!(config["compilerOptions"].get("paths").is_none());
        assert!(config["compilerOptions"].get("baseUrl").is_none());
        assert_eq!(config["include"], json!(["src/index.ts", "src/forms/index.ts"]));
    }

    #[test]
    fn test_tsconfig_includes_path_mappings() {
        let mut paths = PathMappingTable::new();
        paths.insert("@acme/config".into(), "../config/dist/index.d.ts".into());

        let job = DeclarationJob::new(
            Path::new("/repo/packages/ui"),
            Path::new("/repo/tsconfig.json"),
            &plan(&["src/index.ts"]),
            paths,
        );
        let config = job.tsconfig_json();

        assert_eq!(config["extends"], "../../tsconfig.json");
        assert_eq!(config["compilerOptions"]["baseUrl"], ".");
        assert_eq!(
            config["compilerOptions"]["paths"]["@acme/config"],
            json!(["../config/dist/index.d.ts"])
        );
    }

    #[test]
    fn test_memory_limit() {
        let ctx = GlobalContext::with_cwd("/pkg");
        assert_eq!(memory_limit_mb(&ctx), DEFAULT_MEMORY_LIMIT_MB);

        let ctx = GlobalContext::with_cwd("/pkg").with_env(MEMORY_LIMIT_ENV, "4096");
        assert_eq!(memory_limit_mb(&ctx), 4096);

        let ctx = GlobalContext::with_cwd("/pkg").with_env(MEMORY_LIMIT_ENV, "lots");
        assert_eq!(memory_limit_mb(&ctx), DEFAULT_MEMORY_LIMIT_MB);
    }

    #[test]
    fn test_run_invokes_compiler_and_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path()).with_env(MEMORY_LIMIT_ENV, "2048");
        let job = DeclarationJob::new(
            tmp.path(),
            &tmp.path().join("tsconfig.json"),
            &plan(&["src/index.ts"]),
            PathMappingTable::new(),
        );
        let runner = MockRunner::new();

        job.run(&ctx, &runner).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].program.ends_with("tsc"));
        assert_eq!(calls[0].args[0], "-p");
        assert_eq!(
            calls[0].env.get("NODE_OPTIONS").map(String::as_str),
            Some("--max-old-space-size=2048")
        );
        let written: Value = serde_json::from_str(calls[0].config.as_deref().unwrap()).unwrap();
        assert_eq!(written["include"], json!(["src/index.ts"]));

        assert!(temp_configs(tmp.path()).is_empty());
    }

    #[test]
    fn test_failed_run_still_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path());
        let job = DeclarationJob::new(
            tmp.path(),
            &tmp.path().join("tsconfig.json"),
            &plan(&["src/index.ts"]),
            PathMappingTable::new(),
        );
        let runner = MockRunner::new().with_default_exit(2);

        let err = job.run(&ctx, &runner).unwrap_err();
        let build = err.downcast_ref::<crate::builder::BuildError>().unwrap();
        assert_eq!(build.exit_code(), 2);
        assert!(temp_configs(tmp.path()).is_empty());
    }
}
