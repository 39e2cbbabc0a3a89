//! Per-repository workers.
//!
//! A [`RepoWorker`] runs at most one git operation at a time on its own
//! thread. Its [`WorkerState`] is moved into that thread when the operation
//! starts and comes back through the thread's `JoinHandle`, so the state can
//! only be read once [`RepoWorker::join`] has taken it back.
//!
//! ```text
//!  start(op) ──► state moved into task ──► task runs git ──► guard drops:
//!                 busy = true                                  busy = false
//!                                                              notify(id)
//!  join() ◄──────────────────── state returned by JoinHandle ◄─┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel as chan;

use crate::git::GitRunner;
use crate::sync::BusyFlag;

mod state;
mod tasks;

pub use state::{ErrorCounter, ErrorCounters, LogEntry, WorkerState};

use tasks::TaskContext;

/// One git operation a worker can run.
///
/// The `EnumDiscriminants` derive generates [`OperationKind`], the payload-free
/// companion used to address error counters.
#[derive(Debug, Clone, PartialEq, Eq, strum::EnumDiscriminants)]
#[strum_discriminants(
    name(OperationKind),
    vis(pub),
    derive(Hash, strum::Display, strum::IntoStaticStr),
    strum(serialize_all = "kebab-case")
)]
pub enum Operation {
    Status,
    Fetch,
    Pull,
    Checkout { branch: String },
    /// Commits of the last `days` days on all local branches
    Log { days: u32 },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        OperationKind::from(self)
    }
}

impl OperationKind {
    /// Operations that act on the remote or the work tree are left to the
    /// superproject: `pull --recurse-submodules` already updates submodules.
    fn skipped_in_submodules(self) -> bool {
        matches!(self, Self::Fetch | Self::Pull | Self::Checkout)
    }
}

struct InFlight {
    kind: OperationKind,
    handle: JoinHandle<WorkerState>,
}

/// Owns the git operation lifecycle of one repository.
pub struct RepoWorker {
    directory: PathBuf,
    id: usize,
    submodule_depth: usize,
    git: Arc<dyn GitRunner>,
    busy: BusyFlag,
    state: Option<WorkerState>,
    task: Option<InFlight>,
}

impl RepoWorker {
    /// `submodule_depth` is 0 for a top-level repository.
    pub fn new(
        directory: impl Into<PathBuf>,
        id: usize,
        submodule_depth: usize,
        git: Arc<dyn GitRunner>,
    ) -> Self {
        Self {
            directory: directory.into(),
            id,
            submodule_depth,
            git,
            busy: BusyFlag::new(),
            state: Some(WorkerState::default()),
            task: None,
        }
    }

    /// Start `op` on a new thread and return immediately.
    ///
    /// Returns `false` without doing anything when an operation is already in
    /// flight. When the task finishes it sends this worker's id on `notify`.
    ///
    /// Fetch, pull and checkout on a submodule complete immediately without
    /// launching a process.
    pub fn start(&mut self, op: Operation, notify: Option<&chan::Sender<usize>>) -> bool {
        if self.is_busy() {
            log::debug!("{} is busy, ignoring {}", self.short_name(), op.kind());
            return false;
        }
        self.join();

        let kind = op.kind();
        let mut state = self.state.take().unwrap_or_default();
        state.errors.reset(kind);

        if self.is_submodule() && kind.skipped_in_submodules() {
            log::trace!("{} is a submodule, skipping {kind}", self.short_name());
            self.state = Some(state);
            return true;
        }

        let guard = self.busy.raise(self.id, notify.cloned());
        let ctx = TaskContext {
            directory: self.directory.clone(),
            name: self.short_name(),
            git: Arc::clone(&self.git),
        };
        let spawned = thread::Builder::new()
            .name(format!("gbt-worker-{}", self.id))
            .spawn(move || {
                let _guard = guard;
                tasks::run(&ctx, &op, &mut state);
                state
            });

        match spawned {
            Ok(handle) => self.task = Some(InFlight { kind, handle }),
            Err(e) => {
                log::warn!("Failed to start {kind} for {}: {e}", self.short_name());
                self.state = Some(failed_state(kind));
            }
        }
        true
    }

    pub fn status(&mut self) -> bool {
        self.start(Operation::Status, None)
    }

    pub fn fetch(&mut self) -> bool {
        self.start(Operation::Fetch, None)
    }

    pub fn pull(&mut self) -> bool {
        self.start(Operation::Pull, None)
    }

    pub fn checkout(&mut self, branch: &str) -> bool {
        self.start(
            Operation::Checkout {
                branch: branch.to_string(),
            },
            None,
        )
    }

    pub fn log(&mut self, days: u32) -> bool {
        self.start(Operation::Log { days }, None)
    }

    /// Block until the current task finishes and take its state back.
    ///
    /// No-op when nothing was started since the last join.
    pub fn join(&mut self) {
        let Some(InFlight { kind, handle }) = self.task.take() else {
            return;
        };
        let state = match handle.join() {
            Ok(state) => state,
            Err(_) => {
                log::warn!("{} task for {} panicked", kind, self.short_name());
                failed_state(kind)
            }
        };
        self.state = Some(state);
    }

    /// The state of the last joined operation; `None` while one is in flight
    /// or finished but not yet joined.
    pub fn state(&self) -> Option<&WorkerState> {
        self.state.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    pub fn error_occurred(&self) -> bool {
        self.state.as_ref().is_some_and(WorkerState::error_occurred)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_submodule(&self) -> bool {
        self.submodule_depth > 0
    }

    /// Last path component of the repository directory
    pub fn short_name(&self) -> String {
        self.directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.directory.display().to_string())
    }

    /// Short name, indented with `↳` under its superproject for submodules
    pub fn display_name(&self) -> String {
        if self.is_submodule() {
            format!(
                "{}↳ {}",
                " ".repeat(self.submodule_depth - 1),
                self.short_name()
            )
        } else {
            self.short_name()
        }
    }
}

/// What is left of a worker whose task never returned its state.
fn failed_state(kind: OperationKind) -> WorkerState {
    let mut state = WorkerState::default();
    state.errors.get_mut(kind).value = 1;
    state
}
