//! Command-line surface.
//!
//! gbt takes plain words rather than subcommands (`gbt fetch status`,
//! `gbt log 3`), so clap only collects them; [`CommandPlan::from_words`]
//! decides what they mean.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LOG_DAYS: u32 = 7;

const USAGE: &str = "\
Commands:
  gbt status                  Show status for every repository
  gbt fetch                   Run 'git fetch' in every repository
  gbt pull                    Run 'git pull --recurse-submodules' in every repository
  gbt fetch status            Fetch, then show status (the default)
  gbt pull status             Pull, then show status
  gbt checkout <branch>       Run 'git checkout <branch>' in every repository
  gbt log [<days>]            Show commits from the last <days> days (default 7)
  gbt config get <key>        Print a value from the config file
  gbt config set <key> <val>  Store a value in the config file
  gbt config path             Print the config file location";

#[derive(Parser, Debug)]
#[command(
    name = "gbt",
    version,
    about = "Git bulk toolkit: run git across many repositories at once",
    after_help = USAGE
)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log every git command and its timing to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do (see the command list below)
    #[arg(value_name = "COMMAND")]
    pub words: Vec<String>,
}

/// Which remote update runs before a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Fetch,
    Pull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    Get { key: String },
    Set { key: String, value: String },
    Path,
}

/// A validated command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPlan {
    Help,
    /// Optional fetch or pull, optionally followed by a status report
    Sync { update: Option<Update>, status: bool },
    Checkout { branch: String },
    Log { days: u32 },
    Config(ConfigAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    FetchWithPull,
    CheckoutWithOthers,
    LogWithOthers,
    MissingBranch,
    InvalidDays(String),
    UnexpectedWord(String),
    ConfigUsage,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::FetchWithPull => write!(f, "fetch and pull are incompatible"),
            PlanError::CheckoutWithOthers => {
                write!(f, "checkout is not compatible with other commands")
            }
            PlanError::LogWithOthers => write!(f, "log is not compatible with other commands"),
            PlanError::MissingBranch => write!(f, "checkout requires a branch name"),
            PlanError::InvalidDays(word) => write!(f, "'{word}' is not a valid number of days"),
            PlanError::UnexpectedWord(word) => write!(f, "unexpected argument '{word}'"),
            PlanError::ConfigUsage => {
                write!(f, "usage: gbt config get <key> | set <key> <value> | path")
            }
        }
    }
}

impl std::error::Error for PlanError {}

impl CommandPlan {
    pub fn from_words(words: &[String]) -> Result<Self, PlanError> {
        let has = |word: &str| words.iter().any(|w| w == word);

        if has("help") {
            return Ok(CommandPlan::Help);
        }
        if words.first().is_some_and(|w| w == "config") {
            return parse_config(&words[1..]);
        }

        let fetch = has("fetch");
        let pull = has("pull");
        let status = has("status");
        let checkout = has("checkout");
        let log = has("log");

        if fetch && pull {
            return Err(PlanError::FetchWithPull);
        }
        if checkout && (fetch || pull || status || log) {
            return Err(PlanError::CheckoutWithOthers);
        }
        if log && (fetch || pull || status || checkout) {
            return Err(PlanError::LogWithOthers);
        }

        if checkout {
            let mut rest = without(words, "checkout");
            return match (rest.next(), rest.next()) {
                (Some(branch), None) => Ok(CommandPlan::Checkout {
                    branch: branch.clone(),
                }),
                (None, _) => Err(PlanError::MissingBranch),
                (Some(_), Some(extra)) => Err(PlanError::UnexpectedWord(extra.clone())),
            };
        }

        if log {
            let mut rest = without(words, "log");
            return match (rest.next(), rest.next()) {
                (None, _) => Ok(CommandPlan::Log {
                    days: DEFAULT_LOG_DAYS,
                }),
                (Some(days), None) => days
                    .parse()
                    .map(|days| CommandPlan::Log { days })
                    .map_err(|_| PlanError::InvalidDays(days.clone())),
                (Some(_), Some(extra)) => Err(PlanError::UnexpectedWord(extra.clone())),
            };
        }

        if let Some(unknown) = words
            .iter()
            .find(|w| !matches!(w.as_str(), "fetch" | "pull" | "status"))
        {
            return Err(PlanError::UnexpectedWord(unknown.clone()));
        }

        // Bare `gbt` fetches and shows status
        if !(fetch || pull || status) {
            return Ok(CommandPlan::Sync {
                update: Some(Update::Fetch),
                status: true,
            });
        }

        let update = match (fetch, pull) {
            (true, _) => Some(Update::Fetch),
            (_, true) => Some(Update::Pull),
            _ => None,
        };
        Ok(CommandPlan::Sync { update, status })
    }
}

fn without<'a>(words: &'a [String], keyword: &'a str) -> impl Iterator<Item = &'a String> {
    words.iter().filter(move |w| w.as_str() != keyword)
}

fn parse_config(args: &[String]) -> Result<CommandPlan, PlanError> {
    let action = match args {
        [cmd] if cmd == "path" => ConfigAction::Path,
        [cmd, key] if cmd == "get" => ConfigAction::Get { key: key.clone() },
        [cmd, key, value] if cmd == "set" => ConfigAction::Set {
            key: key.clone(),
            value: value.clone(),
        },
        _ => return Err(PlanError::ConfigUsage),
    };
    Ok(CommandPlan::Config(action))
}
