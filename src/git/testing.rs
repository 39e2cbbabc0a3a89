//! Test doubles for [`GitRunner`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel as chan;

use super::{GitError, GitRunner};

/// Canned answer for one git subcommand.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Stdout(String),
    Exit(i32),
    TimedOut,
    Panic,
}

/// A [`GitRunner`] that answers from a table keyed by subcommand
/// (`status`, `log`, ...) and records every invocation.
///
/// Unknown subcommands succeed with empty output.
pub(crate) struct FakeGit {
    replies: HashMap<&'static str, Reply>,
    delay: Duration,
    gate: Option<chan::Receiver<()>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    pub(crate) fn new() -> Self {
        Self {
            replies: HashMap::new(),
            delay: Duration::ZERO,
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reply(mut self, subcommand: &'static str, reply: Reply) -> Self {
        self.replies.insert(subcommand, reply);
        self
    }

    pub(crate) fn stdout(self, subcommand: &'static str, stdout: &str) -> Self {
        self.reply(subcommand, Reply::Stdout(stdout.to_string()))
    }

    /// Sleep this long inside every call.
    pub(crate) fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Block every call until the gate yields a value or its sender is dropped.
    pub(crate) fn gated(mut self, gate: chan::Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl GitRunner for FakeGit {
    fn run(&self, _dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let command = format!("git {}", args.join(" "));
        self.calls.lock().unwrap().push(args.join(" "));

        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let subcommand = args.first().copied().unwrap_or_default();
        match self.replies.get(subcommand).cloned() {
            None => Ok(String::new()),
            Some(Reply::Stdout(stdout)) => Ok(stdout),
            Some(Reply::Exit(code)) => Err(GitError::Exited {
                command,
                code,
                stderr: String::new(),
            }),
            Some(Reply::TimedOut) => Err(GitError::TimedOut { command }),
            Some(Reply::Panic) => panic!("fake git asked to panic on {command}"),
        }
    }
}
