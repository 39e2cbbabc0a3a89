//! The process seam between workers and the external `git` binary.
//!
//! Workers never build `std::process::Command`s themselves; they call a
//! [`GitRunner`]. Production code uses [`SystemGit`], tests substitute
//! runners that return canned output or block until released.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use crate::shell_exec::Cmd;

mod error;
pub mod parse;
#[cfg(test)]
pub(crate) mod testing;

pub use error::GitError;

/// Runs one git subcommand inside a repository directory.
///
/// Implementations are shared between all worker threads.
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` in `dir` and return its stdout.
    ///
    /// A non-zero exit is reported as [`GitError::Exited`].
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, GitError>;
}

/// Runs the `git` found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    timeout: Option<Duration>,
}

impl SystemGit {
    /// `timeout` bounds every single invocation; `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl GitRunner for SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let command = format!("git {}", args.join(" "));
        let context = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        let mut cmd = Cmd::new("git")
            .args(args.iter().copied())
            .current_dir(dir)
            .context(context)
            // Never block a worker on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0");
        if let Some(timeout) = self.timeout {
            cmd = cmd.timeout(timeout);
        }

        let output = cmd.run().map_err(|e| {
            if e.kind() == ErrorKind::TimedOut {
                GitError::TimedOut {
                    command: command.clone(),
                }
            } else {
                GitError::Spawn {
                    command: command.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        if !output.status.success() {
            return Err(GitError::Exited {
                command,
                // Killed by a signal
                code: output.status.code().unwrap_or(1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
