//! ARB files: flat JSON objects of message keys, `@`-prefixed metadata and
//! `@@locale`.
//!
//! Writes are read-modify-write of the whole file, pretty printed with two
//! spaces; key order is preserved through `serde_json`'s `preserve_order`.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::document::Position;
use crate::error::{Error, Result};
use crate::path_de;

pub const LOCALE_KEY: &str = "@@locale";

#[derive(Debug, Clone)]
pub struct ArbFile {
    pub path: PathBuf,
    pub entries: Map<String, Value>,
}

impl ArbFile {
    /// Parse `path`. An empty file has no entries (and so no locale).
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let entries = if text.trim().is_empty() {
            Map::new()
        } else {
            path_de::from_str_with_path(&text).map_err(|reason| Error::ArbParse {
                path: path.to_path_buf(),
                reason,
            })?
        };
        Ok(Self { path: path.to_path_buf(), entries })
    }

    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }

    pub fn locale(&self) -> Option<&str> {
        self.entries
            .get(LOCALE_KEY)
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
    }

    pub fn require_locale(&self) -> Result<&str> {
        self.locale().ok_or_else(|| Error::MissingLocale(self.path.clone()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Message entries (not metadata) with string values, in file order.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(k, _)| !k.starts_with('@'))
            .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
    }

    /// First key, metadata included, whose value equals `value`.
    pub fn key_for_value(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| v.as_str() == Some(value))
            .map(|(k, _)| k.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), Value::String(value.to_string()));
    }

    pub fn write(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.entries).map_err(|e| Error::ArbParse {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Re-read `path`, set `key`, write it back.
pub fn write_entry(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut arb = ArbFile::read(path)?;
    arb.set(key, value);
    arb.write()?;
    debug!(?path, key, "arb entry written");
    Ok(())
}

pub fn is_arb_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("arb"))
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// `*.arb` directly inside `dir`, extension matched case-insensitively.
pub fn list_arb_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::NotFound(dir.to_path_buf()));
    }
    let pattern = format!("{}/*.arb", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions { case_sensitive: false, ..MatchOptions::new() };
    let mut files = Vec::new();
    let entries = glob::glob_with(&pattern, options).map_err(|e| Error::ArbParse {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(err) => warn!(%err, "skipping unreadable arb entry"),
        }
    }
    files.sort();
    Ok(files)
}

/// Lines of an ARB text declaring `key`. Only `"key": value` lines with a
/// single colon count; the column points just inside the opening quote.
pub fn key_locations(text: &str, key: &str) -> Vec<Position> {
    let quoted = format!("\"{key}\"");
    text.lines()
        .enumerate()
        .filter_map(|(line, content)| {
            let parts: Vec<&str> = content.split(':').collect();
            let [left, _] = parts.as_slice() else {
                return None;
            };
            let trimmed = left.trim();
            if trimmed != quoted {
                return None;
            }
            let column = left.chars().count() - trimmed.chars().count() + 1;
            Some(Position::new(line, column))
        })
        .collect()
}

/// Key declared on one ARB line, quotes removed.
pub fn key_on_line(line: &str) -> Option<String> {
    let parts: Vec<&str> = line.split(':').collect();
    let [left, _] = parts.as_slice() else {
        return None;
    };
    let key = left.replace('"', "").trim().to_string();
    (!key.is_empty()).then_some(key)
}
