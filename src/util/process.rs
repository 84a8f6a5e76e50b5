//! Subprocess execution utilities.
//!
//! Commands are described by a [`ProcessBuilder`] and started through a
//! [`ProcessRunner`], which hands back a [`SubprocessHandle`] to wait on.
//! Build tools inherit stdout/stderr so their output reaches the user as-is.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};

use anyhow::{Context, Result};

use crate::util::fs::find_upward;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get an environment variable set on this command.
    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Get all environment variables set on this command.
    pub fn get_envs(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Get the working directory.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Build the Command. Stdio is inherited.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// How a subprocess finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    code: Option<i32>,
}

impl ProcessExit {
    /// An exit with the given status code.
    pub fn from_code(code: i32) -> Self {
        ProcessExit { code: Some(code) }
    }

    /// An exit caused by a signal, with no status code.
    pub fn signaled() -> Self {
        ProcessExit { code: None }
    }

    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The raw status code, if any.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// The status to propagate as our own exit code. Signals map to 1.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(1)
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        ProcessExit {
            code: status.code(),
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "signal"),
        }
    }
}

/// A running subprocess.
pub trait SubprocessHandle: Send {
    /// Block until the process exits.
    fn wait(&mut self) -> Result<ProcessExit>;

    /// Terminate the process and reap it.
    fn kill(&mut self) -> Result<()>;
}

/// Starts subprocesses.
pub trait ProcessRunner: Send + Sync {
    /// Spawn the command without waiting for it.
    fn spawn(&self, cmd: &ProcessBuilder) -> Result<Box<dyn SubprocessHandle>>;

    /// Spawn the command and wait for it to exit.
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessExit> {
        self.spawn(cmd)?.wait()
    }
}

/// Runner backed by real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

struct ChildHandle {
    child: Child,
    program: PathBuf,
}

impl SubprocessHandle for ChildHandle {
    fn wait(&mut self) -> Result<ProcessExit> {
        let status = self
            .child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;
        Ok(status.into())
    }

    fn kill(&mut self) -> Result<()> {
        // Fails only when the child already exited; the wait below still reaps it.
        let _ = self.child.kill();
        self.wait().map(|_| ())
    }
}

impl ProcessRunner for SystemRunner {
    fn spawn(&self, cmd: &ProcessBuilder) -> Result<Box<dyn SubprocessHandle>> {
        tracing::debug!("running `{}`", cmd.display_command());

        let child = cmd
            .build_command()
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", cmd.get_program().display()))?;

        Ok(Box::new(ChildHandle {
            child,
            program: cmd.get_program().to_path_buf(),
        }))
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Locate a Node tool binary.
///
/// Looks for `node_modules/.bin/<name>` in `start` and each ancestor, then
/// in PATH. Falls back to the bare name so that spawning reports the miss.
pub fn find_node_tool(start: &Path, name: &str) -> PathBuf {
    let bin_name = if cfg!(windows) {
        format!("{}.cmd", name)
    } else {
        name.to_string()
    };

    find_upward(start, &Path::new("node_modules").join(".bin").join(&bin_name))
        .or_else(|| find_executable(name))
        .unwrap_or_else(|| PathBuf::from(name))
}
