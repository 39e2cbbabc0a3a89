//! Configuration for gbt.
//!
//! Settings live in the `[default]` section of a TOML file:
//!
//! ```toml
//! [default]
//! root_dir = "~/src"
//! repo_blacklist = "scratch,old-fork"
//! command_timeout_secs = 120
//! ```
//!
//! Every key can be overridden with a `GBT_DEFAULT__<KEY>` environment
//! variable. The file itself is found through [`config_path`].
//!
//! Loading happens once at startup; the resulting [`GbtConfig`] is passed to
//! whatever needs it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Environment, File, FileFormat};
use serde::Deserialize;

mod path;
mod persistence;

pub use path::config_path;
pub use persistence::{get_value, set_value};

/// Root commit of gbt's own repository.
pub const GBT_REPO_ID: &str = "a5eab786a76c18fb765ae60742f970da2f5408fc";

const DEFAULT_MAX_DEPTH: usize = 2;
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// The file as written, before paths are resolved.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    default: RawDefaults,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawDefaults {
    root_dir: Option<String>,
    repos: Vec<String>,
    max_depth: usize,
    repo_blacklist: String,
    include_submodules: bool,
    command_timeout_secs: u64,
    poll_interval_ms: u64,
    self_repo_id: String,
}

impl Default for RawDefaults {
    fn default() -> Self {
        Self {
            root_dir: None,
            repos: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            repo_blacklist: String::new(),
            include_submodules: true,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            self_repo_id: GBT_REPO_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbtConfig {
    /// Directory scanned for repositories, and the base of relative `repos`
    pub root_dir: PathBuf,
    /// Explicit repository list; when empty `root_dir` is scanned
    pub repos: Vec<PathBuf>,
    /// How many directory levels below `root_dir` to scan
    pub max_depth: usize,
    /// Repository short names to leave out
    pub repo_blacklist: BTreeSet<String>,
    pub include_submodules: bool,
    /// Limit for a single git command; `None` waits forever
    pub command_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub self_repo_id: String,
}

impl GbtConfig {
    /// Load from `file` (if it exists) and the environment.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            log::debug!("Loading config from {}", file.display());
            builder = builder.add_source(File::from(file).format(FileFormat::Toml).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("GBT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("default.repos"),
            )
            .build()
            .context("Failed to load configuration")?;

        let raw: RawConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        Self::from_raw(raw.default)
    }

    fn from_raw(raw: RawDefaults) -> anyhow::Result<Self> {
        let root_dir = match raw.root_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => expand(dir),
            _ => etcetera::home_dir().context("Cannot determine home directory; set root_dir")?,
        };

        let repos = raw
            .repos
            .iter()
            .filter(|repo| !repo.trim().is_empty())
            .map(|repo| root_dir.join(expand(repo)))
            .collect();

        let repo_blacklist = raw
            .repo_blacklist
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            root_dir,
            repos,
            max_depth: raw.max_depth,
            repo_blacklist,
            include_submodules: raw.include_submodules,
            command_timeout: (raw.command_timeout_secs > 0)
                .then(|| Duration::from_secs(raw.command_timeout_secs)),
            poll_interval: Duration::from_millis(raw.poll_interval_ms.max(1)),
            self_repo_id: raw.self_repo_id,
        })
    }
}

/// Expand a leading `~`; joining an absolute result onto a base keeps it as is.
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).as_ref())
}
