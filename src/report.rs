//! Rendering of joined worker state into the status and log reports.
//!
//! Renderers return [`StyledLine`]s rather than printing, so the caller
//! decides where they go and tests can inspect the plain text.

use unicode_width::UnicodeWidthStr;

use crate::display::truncate_with_ellipsis;
use crate::styling::{
    BRANCH, ERROR, HINT, INFO, StyledLine, SUCCESS, WARNING, pad_left, pad_right,
};
use crate::worker::{LogEntry, OperationKind, RepoWorker, WorkerState};

/// Branches shown without highlighting.
const MAIN_LINE_BRANCHES: [&str; 2] = ["master", "main"];

/// Space taken by the brackets and separators of a status line.
const STATUS_DECORATION_WIDTH: usize = 10;

/// Failures listed on an error line, in display order.
const LISTED_FAILURES: [(OperationKind, &str); 3] = [
    (OperationKind::Fetch, "Fetching"),
    (OperationKind::Pull, "Pulling"),
    (OperationKind::Checkout, "Checking out branch"),
];

#[derive(Debug, Default)]
pub struct StatusReport {
    pub lines: Vec<StyledLine>,
    /// Some repository is behind, ahead, or has local changes
    pub work_to_do: bool,
    /// The repository whose root commit is `self_repo_id` is behind its upstream
    pub self_update_available: bool,
}

/// Workers whose state can be reported, in order.
fn joined(workers: &[RepoWorker]) -> impl Iterator<Item = (&RepoWorker, &WorkerState)> {
    workers.iter().filter_map(|worker| match worker.state() {
        Some(state) => Some((worker, state)),
        None => {
            log::warn!("No result for {}, skipping", worker.short_name());
            None
        }
    })
}

pub fn render_status(workers: &[RepoWorker], self_repo_id: &str) -> StatusReport {
    let rows: Vec<_> = joined(workers)
        .map(|(worker, state)| (worker, state, worker.display_name(), state.location()))
        .collect();

    let name_width = rows.iter().map(|(_, _, name, _)| name.width()).max().unwrap_or(0);
    let branch_width = rows
        .iter()
        .map(|(_, state, _, _)| state.branch().width())
        .max()
        .unwrap_or(0);
    let location_width = rows
        .iter()
        .map(|(_, _, _, location)| location.width())
        .max()
        .unwrap_or(0);

    let mut report = StatusReport::default();
    for (worker, state, name, location) in &rows {
        if state.error_occurred() {
            let mut line = StyledLine::new();
            let padded = pad_right(
                name,
                name_width + branch_width + location_width + STATUS_DECORATION_WIDTH,
            );
            line.push_styled(format!("{padded}Error(s): {}", failure_summary(state)), ERROR);
            report.lines.push(line);
            continue;
        }

        let dirty = state.changed_file_count() > 0;
        let mut line = StyledLine::new();

        let padded_name = pad_right(name, name_width);
        if worker.is_submodule() {
            line.push_styled(padded_name, HINT);
        } else {
            line.push_raw(padded_name);
        }
        line.push_styled(" [ ", HINT);

        let padded_location = pad_left(location, location_width);
        if state.is_behind() {
            report.work_to_do = true;
            if state.repo_id() == Some(self_repo_id) {
                report.self_update_available = true;
            }
            line.push_styled(padded_location, if dirty { ERROR } else { WARNING });
        } else if state.is_ahead() {
            report.work_to_do = true;
            line.push_styled(padded_location, SUCCESS);
        } else {
            line.push_raw(padded_location);
        }
        line.push_styled(" on ", HINT);

        let padded_branch = pad_right(state.branch(), branch_width);
        if MAIN_LINE_BRANCHES.contains(&state.branch()) {
            line.push_raw(padded_branch);
        } else {
            line.push_styled(padded_branch, BRANCH);
        }
        line.push_styled(" ] ", HINT);

        if dirty {
            report.work_to_do = true;
            line.push_styled(
                format!("{} file(s) modified/untracked", state.changed_file_count()),
                WARNING,
            );
        } else {
            line.push_styled("Nothing to commit", INFO);
        }
        report.lines.push(line);
    }

    report
}

/// Failed fetch/pull/checkout entries, joined by `, `.
fn failure_summary(state: &WorkerState) -> String {
    LISTED_FAILURES
        .iter()
        .filter_map(|&(kind, label)| {
            let counter = state.errors().get(kind);
            if counter.timed_out {
                Some(format!("{label} (timed out)"))
            } else if counter.value != 0 {
                Some(format!("{label} ({})", counter.value))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every worker's commits merged newest first, fitted to `term_width`.
pub fn render_log(workers: &[RepoWorker], term_width: usize) -> Vec<StyledLine> {
    let mut entries: Vec<&LogEntry> = joined(workers)
        .flat_map(|(_, state)| state.log_entries())
        .collect();
    // Stable: commits with equal timestamps keep worker order
    entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

    let repo_width = entries.iter().map(|e| e.repo().width()).max().unwrap_or(0);
    let date_width = entries
        .iter()
        .map(|e| e.relative_date().width())
        .max()
        .unwrap_or(0);
    let author_width = entries.iter().map(|e| e.author().width()).max().unwrap_or(0);

    entries
        .into_iter()
        .map(|entry| {
            let mut line = StyledLine::new();
            line.push_raw(pad_right(entry.repo(), repo_width));
            line.push_styled(" [ ", HINT);
            line.push_raw(pad_right(entry.author(), author_width));
            line.push_raw(" ");
            line.push_raw(pad_right(entry.relative_date(), date_width));
            line.push_styled(" ] ", HINT);

            let room = term_width.saturating_sub(line.width());
            line.push_styled(truncate_with_ellipsis(entry.message(), room), INFO);
            line
        })
        .collect()
}
