//! Git error types.
//!
//! Failures of individual repositories never abort a run; they are recorded on
//! the worker. `GitError` is what the process seam hands back so the worker can
//! decide which counter to touch.

use crate::styling::{ERROR, ERROR_BOLD};

#[derive(Debug)]
pub enum GitError {
    /// The git binary could not be started at all
    Spawn { command: String, message: String },
    /// The command exceeded the configured timeout and was killed
    TimedOut { command: String },
    /// The command ran but exited non-zero
    Exited {
        command: String,
        code: i32,
        stderr: String,
    },
}

impl GitError {
    /// Exit code to record for process-style operations (fetch/pull/checkout).
    ///
    /// A binary that cannot be started is reported like a shell does.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::Spawn { .. } => Some(127),
            GitError::TimedOut { .. } => None,
            GitError::Exited { code, .. } => Some(*code),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GitError::TimedOut { .. })
    }
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::Spawn { command, message } => {
                write!(
                    f,
                    "{ERROR}Failed to run {ERROR_BOLD}{command}{ERROR_BOLD:#}{ERROR}: {message}{ERROR:#}"
                )
            }
            GitError::TimedOut { command } => {
                write!(
                    f,
                    "{ERROR}{ERROR_BOLD}{command}{ERROR_BOLD:#}{ERROR} timed out{ERROR:#}"
                )
            }
            GitError::Exited {
                command,
                code,
                stderr,
            } => {
                write!(
                    f,
                    "{ERROR}{ERROR_BOLD}{command}{ERROR_BOLD:#}{ERROR} exited with status {code}{ERROR:#}"
                )?;
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, "\n{stderr}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GitError {}
