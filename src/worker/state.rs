//! Result state owned by a worker between operations.

use crate::git::parse::StatusSummary;
use crate::utils::capitalize_first;

use super::OperationKind;

/// One commit produced by a log operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    repo: String,
    timestamp: i64,
    relative_date: String,
    author: String,
    message: String,
}

impl LogEntry {
    pub fn new(
        repo: impl Into<String>,
        timestamp: i64,
        relative_date: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            timestamp,
            relative_date: relative_date.into(),
            author: author.into(),
            message: message.into(),
        }
    }

    /// Short name of the repository the commit belongs to
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Committer timestamp (seconds since the Unix epoch)
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn relative_date(&self) -> &str {
        &self.relative_date
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Subject line, followed by ref decoration when present
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure record for one operation kind.
///
/// For fetch, pull and checkout `value` is the exit code of the git command;
/// for status and log it counts failures (malformed lines, failed commands).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCounter {
    pub value: i32,
    pub timed_out: bool,
}

impl ErrorCounter {
    pub fn is_error(&self) -> bool {
        self.value != 0 || self.timed_out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCounters {
    status: ErrorCounter,
    fetch: ErrorCounter,
    pull: ErrorCounter,
    checkout: ErrorCounter,
    log: ErrorCounter,
}

impl ErrorCounters {
    pub fn get(&self, kind: OperationKind) -> ErrorCounter {
        match kind {
            OperationKind::Status => self.status,
            OperationKind::Fetch => self.fetch,
            OperationKind::Pull => self.pull,
            OperationKind::Checkout => self.checkout,
            OperationKind::Log => self.log,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: OperationKind) -> &mut ErrorCounter {
        match kind {
            OperationKind::Status => &mut self.status,
            OperationKind::Fetch => &mut self.fetch,
            OperationKind::Pull => &mut self.pull,
            OperationKind::Checkout => &mut self.checkout,
            OperationKind::Log => &mut self.log,
        }
    }

    pub(crate) fn reset(&mut self, kind: OperationKind) {
        *self.get_mut(kind) = ErrorCounter::default();
    }

    pub fn any(&self) -> bool {
        [
            self.status,
            self.fetch,
            self.pull,
            self.checkout,
            self.log,
        ]
        .iter()
        .any(ErrorCounter::is_error)
    }
}

/// Everything a worker learns about its repository.
///
/// Moved into the worker's task thread for the duration of an operation and
/// handed back when the task is joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerState {
    pub(crate) repo_id: Option<String>,
    pub(crate) status: StatusSummary,
    pub(crate) log_entries: Vec<LogEntry>,
    pub(crate) errors: ErrorCounters,
}

impl WorkerState {
    /// Root commit hash, if the identity lookup succeeded
    pub fn repo_id(&self) -> Option<&str> {
        self.repo_id.as_deref()
    }

    pub fn branch(&self) -> &str {
        &self.status.branch
    }

    /// Location descriptor with its first character capitalized for display
    pub fn location(&self) -> String {
        capitalize_first(&self.status.location)
    }

    pub fn is_behind(&self) -> bool {
        self.status.location.to_lowercase().contains("behind")
    }

    pub fn is_ahead(&self) -> bool {
        self.status.location.to_lowercase().contains("ahead")
    }

    pub fn modified_files(&self) -> &[String] {
        &self.status.modified_files
    }

    pub fn untracked_files(&self) -> &[String] {
        &self.status.untracked_files
    }

    /// Number of modified plus untracked files
    pub fn changed_file_count(&self) -> usize {
        self.status.modified_files.len() + self.status.untracked_files.len()
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        &self.log_entries
    }

    pub fn errors(&self) -> &ErrorCounters {
        &self.errors
    }

    pub fn error_occurred(&self) -> bool {
        self.errors.any()
    }
}
