//! Execution of a validated [`CommandPlan`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, CommandPlan, ConfigAction, Update};
use crate::config::{self, GbtConfig};
use crate::display::{get_terminal_width, horizontal_line};
use crate::git::{GitRunner, SystemGit};
use crate::pool::WorkerPool;
use crate::report::{StatusReport, render_log, render_status};
use crate::repos;
use crate::styling::{SUCCESS, StyledLine, println};
use crate::worker::{ErrorCounter, OperationKind};

/// Run `plan`. Per-repository failures are part of the report, not errors.
pub fn run(plan: CommandPlan, config_override: Option<&Path>) -> anyhow::Result<()> {
    let config_path = config::config_path(config_override);

    match plan {
        CommandPlan::Help => {
            use clap::CommandFactory;
            Cli::command()
                .print_long_help()
                .context("Failed to print help")?;
            Ok(())
        }
        CommandPlan::Config(action) => handle_config(action, config_path),
        CommandPlan::Checkout { branch } => {
            let (mut pool, _) = load_pool(config_path.as_deref())?;
            pool.checkout_all(&branch);
            for worker in pool.workers() {
                let failed = worker
                    .state()
                    .map(|state| state.errors().get(OperationKind::Checkout))
                    .filter(ErrorCounter::is_error);
                if let Some(counter) = failed {
                    log::warn!(
                        "Checking out {branch} failed in {} ({})",
                        worker.short_name(),
                        if counter.timed_out {
                            "timed out".to_string()
                        } else {
                            counter.value.to_string()
                        }
                    );
                }
            }
            Ok(())
        }
        CommandPlan::Log { days } => {
            let (mut pool, _) = load_pool(config_path.as_deref())?;
            pool.log_all(days);
            let width = get_terminal_width();
            print_framed(&render_log(pool.workers(), width), width);
            Ok(())
        }
        CommandPlan::Sync { update, status } => {
            let (mut pool, config) = load_pool(config_path.as_deref())?;
            match update {
                Some(Update::Fetch) => pool.fetch_all(),
                Some(Update::Pull) => pool.pull_all(),
                None => {}
            }
            if status {
                pool.status_all();
                let report = render_status(pool.workers(), &config.self_repo_id);
                print_framed(&report.lines, get_terminal_width());
                print_summary(&report);
            }
            Ok(())
        }
    }
}

fn load_pool(config_path: Option<&Path>) -> anyhow::Result<(WorkerPool, GbtConfig)> {
    let config = GbtConfig::load(config_path)?;
    let git: Arc<dyn GitRunner> = Arc::new(SystemGit::new(config.command_timeout));
    let found = repos::discover(&config, git.as_ref())?;
    if found.is_empty() {
        log::warn!("No repositories found under {}", config.root_dir.display());
    }
    let workers = repos::build_workers(&found, git);
    let pool = WorkerPool::new(workers).with_poll_interval(config.poll_interval);
    Ok((pool, config))
}

fn print_framed(lines: &[StyledLine], width: usize) {
    println!("{}", horizontal_line(width));
    for line in lines {
        println!("{}", line.render());
    }
    println!("{}", horizontal_line(width));
}

fn print_summary(report: &StatusReport) {
    if !report.work_to_do {
        println!("{SUCCESS}Everything up to date{SUCCESS:#}");
    }
    if report.self_update_available {
        println!("{SUCCESS}Update available for gbt{SUCCESS:#}");
    }
}

fn handle_config(action: ConfigAction, path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.context("Cannot determine config directory; set $HOME or use --config")?;
    match action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Get { key } => match config::get_value(&path, &key)? {
            Some(value) => println!("{value}"),
            None => log::info!("{key} is not set in {}", path.display()),
        },
        ConfigAction::Set { key, value } => {
            config::set_value(&path, &key, &value)?;
            log::info!("Set {key} in {}", path.display());
        }
    }
    Ok(())
}
