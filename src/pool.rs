//! Fan-out of one operation across every worker.

use std::time::Duration;

use crossbeam_channel as chan;

use crate::progress::{DEFAULT_POLL_INTERVAL, ProgressReporter};
use crate::worker::{Operation, RepoWorker};

/// Owns the workers for the lifetime of a run.
pub struct WorkerPool {
    workers: Vec<RepoWorker>,
    poll_interval: Duration,
    draw_progress: Option<bool>,
}

impl WorkerPool {
    pub fn new(workers: Vec<RepoWorker>) -> Self {
        Self {
            workers,
            poll_interval: DEFAULT_POLL_INTERVAL,
            draw_progress: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Force the progress line on or off instead of detecting a terminal.
    #[cfg(test)]
    pub fn with_progress(mut self, draw: bool) -> Self {
        self.draw_progress = Some(draw);
        self
    }

    pub fn workers(&self) -> &[RepoWorker] {
        &self.workers
    }

    pub fn status_all(&mut self) {
        self.run(Operation::Status, "Getting status");
    }

    pub fn fetch_all(&mut self) {
        self.run(Operation::Fetch, "Fetching");
    }

    pub fn pull_all(&mut self) {
        self.run(Operation::Pull, "Pulling");
    }

    pub fn checkout_all(&mut self, branch: &str) {
        let label = format!("Checking out {branch}");
        self.run(
            Operation::Checkout {
                branch: branch.to_string(),
            },
            &label,
        );
    }

    pub fn log_all(&mut self, days: u32) {
        let label = format!("Getting logs for last {days} day(s)");
        self.run(Operation::Log { days }, &label);
    }

    /// Start `op` on every worker and wait until all of them are joined.
    fn run(&mut self, op: Operation, label: &str) {
        log::debug!("{label}: {} repositories", self.workers.len());
        let (tx, rx) = chan::unbounded();
        for worker in &mut self.workers {
            worker.start(op.clone(), Some(&tx));
        }
        // Only the tasks hold senders now
        drop(tx);

        let mut reporter = ProgressReporter::new(label, self.poll_interval);
        if let Some(draw) = self.draw_progress {
            reporter = reporter.draw(draw);
        }
        reporter.wait(&mut self.workers, &rx);
    }
}
