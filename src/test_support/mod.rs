//! Test utilities and mocks for pkgsmith unit tests.
//!
//! This module provides a scripted [`ProcessRunner`] so that commands can be
//! exercised without the bundler or the TypeScript compiler installed, plus
//! fixtures for on-disk packages and workspaces.
//!
//! # Example
//!
//! ```rust,ignore
//! use pkgsmith::test_support::{create_test_package, MockRunner};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = create_test_package(r#"{"name": "@acme/ui"}"#);
//!     let runner = MockRunner::new().expect_contains("--format=cjs", 1);
//!
//!     // Run an operation with `&runner`, then inspect `runner.calls()`...
//! }
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::util::process::{ProcessBuilder, ProcessExit, ProcessRunner, SubprocessHandle};

// Re-export fixtures for convenience
pub use fixtures::*;

/// What a matching command does when spawned.
#[derive(Debug, Clone, Copy)]
enum Outcome {
    Exit(i32),
    SpawnError,
}

/// Scripted outcome for commands containing a substring.
#[derive(Debug, Clone)]
struct CommandExpectation {
    substring: String,
    outcome: Outcome,
}

/// A command seen by [`MockRunner`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub cwd: Option<PathBuf>,
    /// Contents of the file passed with `-p`, read at spawn time.
    pub config: Option<String>,
}

impl RecordedCall {
    /// Program and arguments joined with spaces.
    pub fn command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Mock process runner for testing command execution.
///
/// Records every spawned command and answers with the outcome of the first
/// expectation whose substring the command contains, or the default exit code.
#[derive(Debug, Default)]
pub struct MockRunner {
    expectations: Vec<CommandExpectation>,
    calls: Mutex<Vec<RecordedCall>>,
    killed: Arc<Mutex<Vec<String>>>,
    default_exit: i32,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Exit code for commands that match no expectation.
    pub fn with_default_exit(mut self, code: i32) -> Self {
        self.default_exit = code;
        self
    }

    /// Exit with `exit_code` for commands containing `substring`.
    pub fn expect_contains(self, substring: &str, exit_code: i32) -> Self {
        self.script(substring, Outcome::Exit(exit_code))
    }

    /// Fail to spawn commands containing `substring`.
    pub fn fail_spawn_containing(self, substring: &str) -> Self {
        self.script(substring, Outcome::SpawnError)
    }

    fn script(mut self, substring: &str, outcome: Outcome) -> Self {
        self.expectations.push(CommandExpectation {
            substring: substring.to_string(),
            outcome,
        });
        self
    }

    /// All commands spawned so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Commands whose handles were killed, in order.
    pub fn killed(&self) -> Vec<String> {
        lock(&self.killed).clone()
    }
}

impl ProcessRunner for MockRunner {
    fn spawn(&self, cmd: &ProcessBuilder) -> Result<Box<dyn SubprocessHandle>> {
        let config = cmd
            .get_args()
            .iter()
            .position(|a| a == "-p")
            .and_then(|i| cmd.get_args().get(i + 1))
            .and_then(|path| std::fs::read_to_string(path).ok());

        let call = RecordedCall {
            program: cmd.get_program().to_path_buf(),
            args: cmd.get_args().to_vec(),
            env: cmd.get_envs().clone(),
            cwd: cmd.get_cwd().map(|p| p.to_path_buf()),
            config,
        };
        let full_cmd = call.command();
        lock(&self.calls).push(call);

        let outcome = self
            .expectations
            .iter()
            .find(|exp| full_cmd.contains(&exp.substring))
            .map(|exp| exp.outcome)
            .unwrap_or(Outcome::Exit(self.default_exit));

        match outcome {
            Outcome::Exit(code) => Ok(Box::new(MockHandle {
                command: full_cmd,
                exit: ProcessExit::from_code(code),
                killed: Arc::clone(&self.killed),
            })),
            Outcome::SpawnError => bail!("failed to spawn `{}`", full_cmd),
        }
    }
}

struct MockHandle {
    command: String,
    exit: ProcessExit,
    killed: Arc<Mutex<Vec<String>>>,
}

impl SubprocessHandle for MockHandle {
    fn wait(&mut self) -> Result<ProcessExit> {
        Ok(self.exit)
    }

    fn kill(&mut self) -> Result<()> {
        lock(&self.killed).push(self.command.clone());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_records_and_scripts() {
        let runner = MockRunner::new()
            .expect_contains("--format=cjs", 3)
            .with_default_exit(0);

        let cjs = runner
            .run(&ProcessBuilder::new("esbuild").args(["--bundle", "--format=cjs"]))
            .unwrap();
        let esm = runner
            .run(&ProcessBuilder::new("esbuild").args(["--bundle", "--format=esm"]))
            .unwrap();

        assert_eq!(cjs.code(), Some(3));
        assert!(esm.success());
        assert_eq!(runner.calls().len(), 2);
        assert_eq!(runner.calls()[0].command(), "esbuild --bundle --format=cjs");
    }

    #[test]
    fn test_mock_runner_spawn_failure_and_kill() {
        let runner = MockRunner::new().fail_spawn_containing("tsc");

        assert!(runner.spawn(&ProcessBuilder::new("tsc")).is_err());
        let mut handle = runner.spawn(&ProcessBuilder::new("esbuild")).unwrap();
        handle.kill().unwrap();

        assert_eq!(runner.calls().len(), 2);
        assert_eq!(runner.killed(), ["esbuild"]);
    }
}
