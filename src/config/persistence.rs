//! Reading and writing single keys of the config file.
//!
//! Edits go through `toml_edit` so comments and layout of the existing file
//! survive a `gbt config set`.

use std::path::Path;

use anyhow::{Context, bail};
use toml_edit::{Array, DocumentMut, Item, Table, value};

const SECTION: &str = "default";

/// Keys accepted by `gbt config set`, with how their values are typed.
const KNOWN_KEYS: [(&str, KeyKind); 8] = [
    ("root_dir", KeyKind::String),
    ("repos", KeyKind::List),
    ("max_depth", KeyKind::Integer),
    ("repo_blacklist", KeyKind::String),
    ("include_submodules", KeyKind::Bool),
    ("command_timeout_secs", KeyKind::Integer),
    ("poll_interval_ms", KeyKind::Integer),
    ("self_repo_id", KeyKind::String),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    String,
    Integer,
    Bool,
    /// Comma-separated on the command line, a TOML array in the file
    List,
}

fn key_kind(key: &str) -> Option<KeyKind> {
    KNOWN_KEYS
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, kind)| *kind)
}

/// The value of `key` in the `[default]` section, as text.
///
/// A missing file or key yields `None`.
pub fn get_value(path: &Path, key: &str) -> anyhow::Result<Option<String>> {
    let Some(doc) = read_document(path)? else {
        return Ok(None);
    };

    let Some(item) = doc.get(SECTION).and_then(|section| section.get(key)) else {
        return Ok(None);
    };
    Ok(item.as_value().map(|v| match v.as_str() {
        Some(s) => s.to_string(),
        None => {
            // Drop surrounding whitespace and trailing comments
            let mut bare = v.clone();
            bare.decor_mut().clear();
            bare.to_string()
        }
    }))
}

/// Set `key` in the `[default]` section, creating the file if needed.
pub fn set_value(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let Some(kind) = key_kind(key) else {
        let known: Vec<_> = KNOWN_KEYS.iter().map(|(k, _)| *k).collect();
        bail!("Unknown config key '{key}' (expected one of: {})", known.join(", "));
    };

    let item = match kind {
        KeyKind::String => value(raw),
        KeyKind::Integer => {
            let n: i64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|n| *n >= 0)
                .with_context(|| format!("'{raw}' is not a valid value for {key}"))?;
            value(n)
        }
        KeyKind::Bool => {
            let b: bool = raw
                .trim()
                .parse()
                .with_context(|| format!("'{raw}' is not a valid value for {key} (true/false)"))?;
            value(b)
        }
        KeyKind::List => {
            let array: Array = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            value(array)
        }
    };

    let mut doc = read_document(path)?.unwrap_or_default();
    if !doc.get(SECTION).is_some_and(Item::is_table) {
        doc[SECTION] = Item::Table(Table::new());
    }
    doc[SECTION][key] = item;

    write_atomically(path, &doc.to_string())
}

fn read_document(path: &Path) -> anyhow::Result<Option<DocumentMut>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let doc = content
        .parse::<DocumentMut>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(doc))
}

fn write_atomically(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace config file {}", path.display()))?;

    log::debug!("Wrote {}", path.display());
    Ok(())
}
