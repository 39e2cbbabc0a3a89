//! Operation bodies, run on a worker's task thread.
//!
//! Each body receives the worker's state by `&mut` for the length of the
//! operation. Nothing here returns an error: every failure ends up in the
//! operation's [`ErrorCounter`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::git::parse::{LOG_FORMAT, StatusSummary, parse_log, parse_root_commit, parse_status};
use crate::git::{GitError, GitRunner};
use crate::utils::{since_date, today};

use super::state::{ErrorCounter, WorkerState};
use super::{Operation, OperationKind};

/// What a task needs to know about its repository.
pub(super) struct TaskContext {
    pub directory: PathBuf,
    pub name: String,
    pub git: Arc<dyn GitRunner>,
}

impl TaskContext {
    fn git(&self, args: &[&str]) -> Result<String, GitError> {
        self.git.run(&self.directory, args)
    }
}

pub(super) fn run(ctx: &TaskContext, op: &Operation, state: &mut WorkerState) {
    log::trace!("{} starting {}", ctx.name, op.kind());
    match op {
        Operation::Status => status(ctx, state),
        Operation::Log { days } => log_since(ctx, *days, state),
        Operation::Fetch => process(ctx, &["fetch"], state.errors.get_mut(OperationKind::Fetch)),
        Operation::Pull => process(
            ctx,
            &["pull", "--recurse-submodules"],
            state.errors.get_mut(OperationKind::Pull),
        ),
        Operation::Checkout { branch } => process(
            ctx,
            &["checkout", branch],
            state.errors.get_mut(OperationKind::Checkout),
        ),
    }
    log::trace!("{} finished {}", ctx.name, op.kind());
}

fn status(ctx: &TaskContext, state: &mut WorkerState) {
    state.repo_id = match ctx.git(&["rev-list", "HEAD"]) {
        Ok(stdout) => parse_root_commit(&stdout),
        Err(e) => {
            log::debug!("Identity lookup failed for {}: {e}", ctx.name);
            None
        }
    };

    state.status = StatusSummary::default();
    match ctx.git(&["status", "--short", "--branch"]) {
        Ok(stdout) => state.status = parse_status(&stdout),
        Err(e) => count_failure(ctx, state.errors.get_mut(OperationKind::Status), &e),
    }
}

fn log_since(ctx: &TaskContext, days: u32, state: &mut WorkerState) {
    state.log_entries.clear();

    let pretty = format!("--pretty=format:{LOG_FORMAT}");
    let since = format!("--since={}", since_date(today(), days));
    match ctx.git(&["log", &pretty, &since, "--branches"]) {
        Ok(stdout) => {
            let parsed = parse_log(&ctx.name, &stdout);
            let counter = state.errors.get_mut(OperationKind::Log);
            counter.value = counter
                .value
                .saturating_add(i32::try_from(parsed.malformed).unwrap_or(i32::MAX));
            state.log_entries = parsed.entries;
        }
        Err(e) => count_failure(ctx, state.errors.get_mut(OperationKind::Log), &e),
    }
}

/// Run a command whose exit code is the whole result.
fn process(ctx: &TaskContext, args: &[&str], counter: &mut ErrorCounter) {
    match ctx.git(args) {
        Ok(_) => *counter = ErrorCounter::default(),
        Err(e) => {
            log::debug!("{}: {e}", ctx.name);
            *counter = ErrorCounter {
                value: e.exit_code().unwrap_or(0),
                timed_out: e.is_timeout(),
            };
        }
    }
}

/// Record one failure of a counting operation (status, log).
fn count_failure(ctx: &TaskContext, counter: &mut ErrorCounter, err: &GitError) {
    log::debug!("{}: {err}", ctx.name);
    counter.value = counter.value.saturating_add(1);
    counter.timed_out |= err.is_timeout();
}
