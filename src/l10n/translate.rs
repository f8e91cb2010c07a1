//! Translation backends, cancellation, progress reporting and batch
//! results.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::error::{Error, Result};
use crate::path_de;

/// Machine translation between two locales. `None` means the text could
/// not be translated; callers record that as a per-item failure.
pub trait Translator {
    fn translate(&self, source: &str, target: &str, text: &str) -> Option<String>;
}

/// Translations looked up in a JSON glossary shaped as
/// `{ "<target locale>": { "<source text>": "<translation>" } }`.
///
/// A locale such as `zh_CN` falls back to its language (`zh`). Translating
/// into the source locale returns the text unchanged.
#[derive(Debug, Clone, Default)]
pub struct GlossaryTranslator {
    entries: HashMap<String, HashMap<String, String>>,
}

impl GlossaryTranslator {
    pub fn new(entries: HashMap<String, HashMap<String, String>>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let entries = path_de::from_str_with_path(&text).map_err(|reason| Error::Settings {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(Self { entries })
    }

    fn table(&self, locale: &str) -> Option<&HashMap<String, String>> {
        self.entries.get(locale).or_else(|| {
            let language = locale.split(['_', '-']).next()?;
            self.entries.get(language)
        })
    }
}

impl Translator for GlossaryTranslator {
    fn translate(&self, source: &str, target: &str, text: &str) -> Option<String> {
        if source == target {
            return Some(text.to_string());
        }
        let found = self.table(target).and_then(|t| t.get(text)).cloned();
        if found.is_none() {
            debug!(source, target, text, "no glossary entry");
        }
        found
    }
}

/// Shared flag for stopping a batch between items. Work already written
/// stays written.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PROGRESS
// ————————————————————————————————————————————————————————————————————————————

/// Progress sink for long batches.
pub trait Progress: Send + Sync {
    fn set_total(&self, _n: u64) {}
    fn step(&self, _msg: &str) {}
    fn message(&self, _msg: &str) {}
    fn finish(&self, _msg: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

/// Terminal spinner / bar.
pub struct IndicatifProgress {
    pb: ProgressBar,
}

impl IndicatifProgress {
    pub fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style.tick_chars("-\\|/ "));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb }
    }

    pub fn bar(len: u64) -> Self {
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}/{len:3} {msg}") {
            pb.set_style(style);
        }
        Self { pb }
    }
}

impl Progress for IndicatifProgress {
    fn set_total(&self, n: u64) {
        self.pb.set_length(n);
    }
    fn step(&self, msg: &str) {
        self.pb.inc(1);
        self.pb.set_message(msg.to_string());
    }
    fn message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }
    fn finish(&self, msg: &str) {
        self.pb.finish_with_message(msg.to_string());
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REPORTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
    /// Entry key, when the failure concerns one entry.
    pub key: Option<String>,
    pub reason: String,
}

/// What a batch did. Failures do not abort the batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// `(file, key)` pairs written.
    pub written: Vec<(PathBuf, String)>,
    pub failures: Vec<Failure>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn fail(&mut self, path: &Path, key: Option<&str>, reason: impl Into<String>) {
        self.failures.push(Failure {
            path: path.to_path_buf(),
            key: key.map(str::to_string),
            reason: reason.into(),
        });
    }

    /// All failures as one message, one line each.
    pub fn warning(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .failures
            .iter()
            .map(|f| {
                let name = super::arb::file_name(&f.path);
                match &f.key {
                    Some(key) => format!("{name} [{key}]: {}", f.reason),
                    None => format!("{name}: {}", f.reason),
                }
            })
            .collect();
        Some(lines.join("\n"))
    }
}
