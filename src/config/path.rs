//! Config file location.

use std::path::{Path, PathBuf};

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

/// Get the config file path.
///
/// Priority:
/// 1. CLI `--config` flag
/// 2. `GBT_CONFIG_PATH` environment variable
/// 3. Platform-specific default location (`~/.config/gbt/config.toml` on Linux and macOS)
pub fn config_path(cli_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_override {
        return Some(path.to_path_buf());
    }

    if let Some(path) = std::env::var_os("GBT_CONFIG_PATH").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    // XDG on Linux and macOS, %APPDATA% on Windows
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("gbt").join("config.toml"))
}
