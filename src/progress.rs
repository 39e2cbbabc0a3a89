//! Live progress line shown while workers run.
//!
//! The reporter redraws a single carriage-return line until no worker is busy,
//! waking whenever a worker announces completion and at least once per poll
//! interval. Once everything is idle it clears the line and joins every worker,
//! so their state is readable when [`ProgressReporter::wait`] returns.

use std::io::{IsTerminal, Write};
use std::time::Duration;

use crossbeam_channel::{self as chan, RecvTimeoutError};
use crossterm::{
    ExecutableCommand,
    cursor::MoveToColumn,
    terminal::{Clear, ClearType},
};

use crate::styling::PROGRESS;
use crate::worker::RepoWorker;

/// Cells in the progress bar.
const BAR_WIDTH: usize = 30;

/// Glyphs for the partially filled cell, in eighths.
const PARTIAL_CELLS: [&str; 8] = [" ", "▏", "▎", "▍", "▌", "▋", "▊", "▉"];

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct ProgressReporter {
    label: String,
    interval: Duration,
    draw: bool,
}

impl ProgressReporter {
    /// The bar is drawn only when stdout is a terminal.
    pub fn new(label: impl Into<String>, interval: Duration) -> Self {
        Self {
            label: label.into(),
            interval,
            draw: std::io::stdout().is_terminal(),
        }
    }

    /// Override terminal detection.
    pub fn draw(mut self, draw: bool) -> Self {
        self.draw = draw;
        self
    }

    /// Block until no worker is busy, then join all of them.
    ///
    /// `completions` carries worker ids as tasks finish. It only shortens the
    /// wait; a disconnected channel falls back to sleeping the poll interval.
    pub fn wait(&self, workers: &mut [RepoWorker], completions: &chan::Receiver<usize>) {
        let total = workers.len();
        if total == 0 {
            return;
        }

        loop {
            let busy = workers.iter().filter(|w| w.is_busy()).count();
            if self.draw {
                let progress = (total - busy) as f64 / total as f64;
                self.render(progress, busy);
            }
            if busy == 0 {
                break;
            }

            match completions.recv_timeout(self.interval) {
                Ok(id) => log::trace!("Worker {id} finished"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => std::thread::sleep(self.interval),
            }
        }

        if self.draw {
            self.clear();
        }

        for worker in workers.iter_mut() {
            worker.join();
        }
    }

    fn render(&self, progress: f64, busy: usize) {
        let mut stdout = anstream::stdout();
        let line = format!(
            "\r{} {} ({busy} workers still busy) ",
            progress_bar(progress),
            self.label
        );
        // A broken terminal must not stop the run
        if let Err(e) = stdout.write_all(line.as_bytes()).and_then(|()| stdout.flush()) {
            log::debug!("Failed to draw progress: {e}");
        }
    }

    fn clear(&self) {
        let mut stdout = std::io::stdout();
        let result = stdout
            .execute(Clear(ClearType::CurrentLine))
            .and_then(|out| out.execute(MoveToColumn(0)))
            .map(|_| ());
        if let Err(e) = result {
            log::debug!("Failed to clear progress line: {e}");
        }
    }
}

/// Render `progress` (0.0 ..= 1.0) as a framed bar of eighth-block glyphs.
pub fn progress_bar(progress: f64) -> String {
    let cells = progress.clamp(0.0, 1.0) * BAR_WIDTH as f64;
    let full = cells.floor() as usize;

    let mut bar = "█".repeat(full);
    if full < BAR_WIDTH {
        let eighths = (cells.fract() * PARTIAL_CELLS.len() as f64).floor() as usize;
        bar.push_str(PARTIAL_CELLS[eighths.min(PARTIAL_CELLS.len() - 1)]);
        bar.push_str(&" ".repeat(BAR_WIDTH - full - 1));
    }

    format!("▕{PROGRESS}{bar}{PROGRESS:#}▏")
}
