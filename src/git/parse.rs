//! Parsers for the git output gbt consumes.
//!
//! Both parsers are total: malformed input never fails the parse, it is either
//! ignored (status file lines of unexpected shape) or counted (log lines).

use std::sync::LazyLock;

use regex::Regex;

use crate::worker::LogEntry;

/// Location shown when the branch line carries no ahead/behind marker.
pub const UP_TO_DATE: &str = "Up to date";

/// Location shown for a repository without commits.
pub const EMPTY_REPOSITORY: &str = "Empty";

/// Branch shown before the first successful status run.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// `git log` pretty format: commit timestamp, relative date, committer name and
/// subject with ref decoration, NUL-separated so commit text cannot split a field.
pub const LOG_FORMAT: &str = "%ct%x00%cr%x00%cn%x00%s%d";

const LOG_FIELD_SEPARATOR: char = '\0';

/// Marker git prints instead of a branch name in a repository without commits.
const NO_COMMITS_MARKER: &str = "No commits yet on";

static TRACKING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*)\]").expect("tracking regex is valid"));

/// Parsed `git status --short --branch` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub branch: String,
    /// Raw tracking descriptor (`behind 2`, `ahead 1, behind 3`, ...)
    pub location: String,
    pub modified_files: Vec<String>,
    pub untracked_files: Vec<String>,
}

impl Default for StatusSummary {
    fn default() -> Self {
        Self {
            branch: UNKNOWN_BRANCH.to_string(),
            location: UP_TO_DATE.to_string(),
            modified_files: Vec::new(),
            untracked_files: Vec::new(),
        }
    }
}

pub fn parse_status(output: &str) -> StatusSummary {
    let mut summary = StatusSummary::default();

    for line in output.lines() {
        if let Some(header) = line.strip_prefix("##") {
            parse_branch_header(header.trim_start(), &mut summary);
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(indicator), Some(filename), None) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        if indicator.contains('M') {
            summary.modified_files.push(filename.to_string());
        }
        if indicator == "??" {
            summary.untracked_files.push(filename.to_string());
        }
    }

    summary
}

fn parse_branch_header(header: &str, summary: &mut StatusSummary) {
    let branch = match header.find("...") {
        Some(idx) => &header[..idx],
        None => header,
    };
    summary.branch = branch.to_string();

    if let Some(caps) = TRACKING_RE.captures(header) {
        summary.location = caps[1].to_string();
    }

    if branch.contains(NO_COMMITS_MARKER) {
        summary.branch = branch
            .split_whitespace()
            .last()
            .unwrap_or(UNKNOWN_BRANCH)
            .to_string();
        summary.location = EMPTY_REPOSITORY.to_string();
    }
}

/// Result of parsing `git log` output for one repository.
#[derive(Debug, Default)]
pub struct LogParse {
    pub entries: Vec<LogEntry>,
    /// Lines that did not have the expected four fields
    pub malformed: u32,
}

pub fn parse_log(repo: &str, output: &str) -> LogParse {
    let mut parsed = LogParse::default();

    for line in output.lines().filter(|line| !line.is_empty()) {
        let fields: Vec<&str> = line.split(LOG_FIELD_SEPARATOR).collect();
        let [timestamp, relative_date, author, message] = fields.as_slice() else {
            log::debug!("Malformed log line in {repo}: {line:?}");
            parsed.malformed += 1;
            continue;
        };

        let Ok(timestamp) = timestamp.trim().parse::<i64>() else {
            log::debug!("Unparseable commit timestamp in {repo}: {timestamp:?}");
            parsed.malformed += 1;
            continue;
        };

        parsed.entries.push(LogEntry::new(
            repo,
            timestamp,
            *relative_date,
            *author,
            message.trim_end(),
        ));
    }

    parsed
}

/// Root commit hash from `git rev-list HEAD` output (its last line).
pub fn parse_root_commit(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}
