//! Finding the repositories a run operates on.

use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use rayon::prelude::*;

use crate::config::GbtConfig;
use crate::git::GitRunner;
use crate::worker::RepoWorker;

/// A repository to build a worker for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepoLocation {
    pub path: PathBuf,
    /// 0 for a top-level repository, 1 for its submodules, and so on
    pub submodule_depth: usize,
}

/// All repositories named by `config`, sorted by path.
///
/// Explicit `repos` are taken as given (entries without a `.git` are skipped
/// with a warning); otherwise `root_dir` is scanned. Blacklisted names are
/// dropped, then submodules are added below their superprojects.
pub fn discover(config: &GbtConfig, git: &dyn GitRunner) -> anyhow::Result<Vec<RepoLocation>> {
    let mut top_level = Vec::new();
    if config.repos.is_empty() {
        if !config.root_dir.exists() {
            anyhow::bail!("Root directory {} does not exist", config.root_dir.display());
        }
        discover_repo_roots(&config.root_dir, 0, config.max_depth, &mut top_level)?;
    } else {
        for path in &config.repos {
            if has_git_entry(path) {
                top_level.push(path.clone());
            } else {
                log::warn!("{} is not a git repository, skipping", path.display());
            }
        }
    }

    let mut seen = HashSet::new();
    let top_level: Vec<PathBuf> = top_level
        .into_iter()
        .map(|path| canonicalize_best_effort(&path))
        .filter(|path| !is_blacklisted(path, &config.repo_blacklist))
        .filter(|path| seen.insert(path.clone()))
        .collect();

    let mut repos: Vec<RepoLocation> = if config.include_submodules {
        top_level
            .par_iter()
            .flat_map_iter(|path| {
                let mut found = vec![RepoLocation {
                    path: path.clone(),
                    submodule_depth: 0,
                }];
                collect_submodules(git, path, 1, &config.repo_blacklist, &mut found);
                found
            })
            .collect()
    } else {
        top_level
            .into_iter()
            .map(|path| RepoLocation {
                path,
                submodule_depth: 0,
            })
            .collect()
    };

    repos.sort();
    repos.dedup_by(|a, b| a.path == b.path);
    log::debug!("Discovered {} repositories", repos.len());
    Ok(repos)
}

/// One worker per repository, ids in order.
pub fn build_workers(repos: &[RepoLocation], git: Arc<dyn GitRunner>) -> Vec<RepoWorker> {
    repos
        .iter()
        .enumerate()
        .map(|(id, repo)| RepoWorker::new(&repo.path, id, repo.submodule_depth, Arc::clone(&git)))
        .collect()
}

fn discover_repo_roots(
    dir: &Path,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<PathBuf>,
) -> anyhow::Result<()> {
    if has_git_entry(dir) {
        out.push(dir.to_path_buf());
        return Ok(());
    }
    if depth >= max_depth {
        return Ok(());
    }

    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => return Ok(()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", dir.display()));
        }
    };

    let mut entries = read_dir
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_dir() || file_type.is_symlink() {
            continue;
        }
        if is_ignored_dir_name(&entry.file_name()) {
            continue;
        }
        discover_repo_roots(&entry.path(), depth + 1, max_depth, out)?;
    }

    Ok(())
}

/// Checked-out submodules of `repo`, recursively.
fn collect_submodules(
    git: &dyn GitRunner,
    repo: &Path,
    depth: usize,
    blacklist: &BTreeSet<String>,
    out: &mut Vec<RepoLocation>,
) {
    if !repo.join(".gitmodules").is_file() {
        return;
    }
    let output = match git.run(
        repo,
        &["config", "--file", ".gitmodules", "--get-regexp", "path"],
    ) {
        Ok(output) => output,
        Err(e) => {
            log::debug!("No submodules listed in {}: {e}", repo.display());
            return;
        }
    };

    for relative in parse_submodule_paths(&output) {
        let path = repo.join(relative);
        // Not initialized yet
        if !has_git_entry(&path) || is_blacklisted(&path, blacklist) {
            continue;
        }
        out.push(RepoLocation {
            path: path.clone(),
            submodule_depth: depth,
        });
        collect_submodules(git, &path, depth + 1, blacklist, out);
    }
}

/// Paths from `git config --file .gitmodules --get-regexp path` output
/// (`submodule.<name>.path <path>` per line).
fn parse_submodule_paths(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter_map(|line| line.split_once(char::is_whitespace))
        .filter(|(key, _)| key.starts_with("submodule.") && key.ends_with(".path"))
        .map(|(_, path)| path.trim())
        .filter(|path| !path.is_empty())
        .collect()
}

/// A `.git` directory for repositories, a `.git` file for submodules and worktrees.
fn has_git_entry(dir: &Path) -> bool {
    dir.join(".git").exists()
}

fn is_blacklisted(path: &Path, blacklist: &BTreeSet<String>) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| blacklist.contains(name))
}

fn is_ignored_dir_name(name: &OsStr) -> bool {
    matches!(name.to_str(), Some(".git" | "node_modules" | "target"))
}

fn canonicalize_best_effort(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
