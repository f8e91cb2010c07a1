//! Error taxonomy shared by every command.
//!
//! Two families matter to callers: user-input errors (bad class name, empty
//! JSON, key conflicts) that should be shown inline before anything is
//! mutated, and environment errors (missing outline, missing template ARB,
//! unreadable config) that abort the command. Per-file translation failures
//! are not errors; they are collected in batch reports.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Shown as a warning / validation message; nothing was changed.
    UserInput,
    /// Blocking notification; the command was aborted.
    Environment,
}

#[derive(Error, Debug)]
pub enum Error {
    // ——— user input ———————————————————————————————————————————————————————
    #[error("invalid class name '{0}': must start with an upper-case letter, contain only letters, digits and single underscores, and not end with '_'")]
    InvalidClassName(String),

    #[error("class '{0}' already exists in this file")]
    DuplicateClassName(String),

    #[error("json content is empty")]
    EmptyJson,

    #[error("json format error: {0}")]
    InvalidJson(String),

    #[error("no fields selected for {0}")]
    NoFieldsSelected(&'static str),

    #[error("no class found at the cursor")]
    NoClassAtCursor,

    #[error("no string literal found at the cursor")]
    NoLiteralAtCursor,

    #[error("text is blank, nothing to translate")]
    BlankLiteral,

    #[error("localization key '{0}' is invalid: only letters, digits and '_' are allowed and it cannot start with a digit")]
    InvalidKey(String),

    #[error("localization key '{0}' already exists")]
    DuplicateKey(String),

    #[error("could not derive a localization key, supply one explicitly")]
    MissingKey,

    #[error("'{0}' is not an .arb file")]
    NotArbFile(PathBuf),

    #[error("invalid name '{0}': must be non-empty and contain no path separators")]
    InvalidFileName(String),

    #[error("'{0}' already exists")]
    AlreadyExists(PathBuf),

    // ——— environment ——————————————————————————————————————————————————————
    #[error("outline is unavailable for {0}")]
    OutlineUnavailable(PathBuf),

    #[error("failed to parse outline {path}: {reason}")]
    OutlineParse { path: PathBuf, reason: String },

    #[error("arb template file not found at {0}; provide lib/l10n/app_en.arb or configure it in l10n.yaml")]
    TemplateArbMissing(PathBuf),

    #[error("{0} does not define @@locale")]
    MissingLocale(PathBuf),

    #[error("failed to parse {path}: {reason}")]
    ArbParse { path: PathBuf, reason: String },

    #[error("failed to parse l10n.yaml: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("failed to parse settings {path}: {reason}")]
    Settings { path: PathBuf, reason: String },

    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("formatter failed: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::InvalidClassName(_)
            | Error::DuplicateClassName(_)
            | Error::EmptyJson
            | Error::InvalidJson(_)
            | Error::NoFieldsSelected(_)
            | Error::NoClassAtCursor
            | Error::NoLiteralAtCursor
            | Error::BlankLiteral
            | Error::InvalidKey(_)
            | Error::DuplicateKey(_)
            | Error::MissingKey
            | Error::NotArbFile(_)
            | Error::InvalidFileName(_)
            | Error::AlreadyExists(_) => Severity::UserInput,
            _ => Severity::Environment,
        }
    }

    pub fn is_user_input(&self) -> bool {
        self.severity() == Severity::UserInput
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
