//! Per-target bundler invocations.

use std::path::Path;

use crate::builder::plan::{BuildPlan, EntryPoint};
use crate::core::target::RuntimeTarget;
use crate::util::process::ProcessBuilder;

/// Name of the bundler binary.
pub const TRANSPILER: &str = "esbuild";

/// One bundler run producing a target's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileJob {
    target: RuntimeTarget,
    out_dir: String,
    entry_points: Vec<EntryPoint>,
    external: Vec<String>,
    watch: bool,
}

impl TranspileJob {
    /// Job for `target`, or `None` when the target is off or has nothing to build.
    pub fn for_target(
        plan: &BuildPlan,
        target: RuntimeTarget,
        external: &[String],
        watch: bool,
    ) -> Option<Self> {
        let entry_points = plan.entry_points(target);
        if entry_points.is_empty() {
            return None;
        }

        Some(TranspileJob {
            target,
            out_dir: plan.output_dir(target),
            entry_points,
            external: external.to_vec(),
            watch,
        })
    }

    /// All jobs for a plan, in build order.
    pub fn for_plan(plan: &BuildPlan, external: &[String], watch: bool) -> Vec<Self> {
        plan.targets()
            .iter()
            .filter_map(|target| TranspileJob::for_target(plan, target, external, watch))
            .collect()
    }

    pub fn target(&self) -> RuntimeTarget {
        self.target
    }

    pub fn out_dir(&self) -> &str {
        &self.out_dir
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Bundler command line for this job.
    ///
    /// The bundler keeps its own log level so its output reaches the user unchanged.
    pub fn command(&self, program: &Path, cwd: &Path) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(program)
            .cwd(cwd)
            .args(
                self.entry_points
                    .iter()
                    .map(|point| format!("{}={}", point.name, point.source)),
            )
            .arg("--bundle")
            .arg(format!("--outdir={}", self.out_dir))
            .arg(format!("--format={}", self.target.format()))
            .arg(format!("--platform={}", self.target.platform()))
            .arg("--sourcemap")
            .args(self.external.iter().map(|name| format!("--external:{}", name)));

        if self.watch {
            cmd = cmd.arg("--watch");
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Entry;
    use crate::core::target::EnabledTargets;

    fn plan(paths: &[&str], targets: EnabledTargets) -> BuildPlan {
        let entries: Vec<Entry> = paths.iter().map(|p| Entry::new(*p)).collect();
        BuildPlan::new(&entries, targets, "src")
    }

    #[test]
    fn test_command_line() {
        let plan = plan(
            &["src/index.browser.ts", "src/index.ts"],
            EnabledTargets {
                primary: false,
                compat: true,
                browser: true,
            },
        );
        let external = vec!["react".to_string()];
        let job = TranspileJob::for_target(&plan, RuntimeTarget::Browser, &external, false).unwrap();
        let cmd = job.command(Path::new("esbuild"), Path::new("/pkg"));

        assert_eq!(
            cmd.get_args(),
            [
                "index=src/index.browser.ts",
                "--bundle",
                "--outdir=dist/browser",
                "--format=esm",
                "--platform=browser",
                "--sourcemap",
                "--external:react",
            ]
        );
        assert_eq!(cmd.get_cwd(), Some(Path::new("/pkg")));
    }

    #[test]
    fn test_watch_flag_and_default_log_level() {
        let plan = plan(
            &["src/index.ts"],
            EnabledTargets {
                primary: false,
                compat: true,
                browser: false,
            },
        );
        let job = TranspileJob::for_target(&plan, RuntimeTarget::Compat, &[], true).unwrap();
        let args = job.command(Path::new("esbuild"), Path::new(".")).get_args().to_vec();

        assert!(args.contains(&"--format=cjs".to_string()));
        assert!(args.contains(&"--platform=node".to_string()));
        assert!(args.contains(&"--outdir=dist".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--watch"));
        assert!(!args.iter().any(|a| a.starts_with("--log-level")));
    }

    #[test]
    fn test_jobs_skip_empty_targets() {
        let plan = plan(
            &["src/server.node.ts"],
            EnabledTargets {
                primary: false,
                compat: true,
                browser: true,
            },
        );
        let jobs = TranspileJob::for_plan(&plan, &[], false);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].target(), RuntimeTarget::Compat);
        assert_eq!(jobs[0].out_dir(), "dist");
    }

    #[test]
    fn test_jobs_follow_build_order() {
        let plan = plan(
            &["src/index.ts"],
            EnabledTargets {
                primary: true,
                compat: true,
                browser: true,
            },
        );
        let targets: Vec<_> = TranspileJob::for_plan(&plan, &[], false)
            .iter()
            .map(TranspileJob::target)
            .collect();
        assert_eq!(
            targets,
            vec![RuntimeTarget::Primary, RuntimeTarget::Compat, RuntimeTarget::Browser]
        );
    }
}
