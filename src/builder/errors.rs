//! Build error types.

use thiserror::Error;

use crate::util::process::{ProcessBuilder, ProcessExit};

/// Error while running a build step.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("`{command}` failed with {exit}")]
    SubprocessFailed { command: String, exit: ProcessExit },
}

impl BuildError {
    /// Exit code the CLI should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::SubprocessFailed { exit, .. } => exit.exit_code(),
        }
    }
}

/// Turn a non-zero exit of `cmd` into [`BuildError::SubprocessFailed`].
pub fn ensure_success(cmd: &ProcessBuilder, exit: ProcessExit) -> Result<(), BuildError> {
    if exit.success() {
        return Ok(());
    }
    let program = cmd.get_program();
    let command = program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned();
    Err(BuildError::SubprocessFailed { command, exit })
}
