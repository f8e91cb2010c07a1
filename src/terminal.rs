//! Flutter tool invocations: code generation, dependency listing and
//! localization generation.

use std::fmt;
use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::error::{Error, Result};

/// A shell command line, kept as text so it can be shown or run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub line: String,
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

impl ToolCommand {
    fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    /// Run through the platform shell in `cwd`, inheriting stdio.
    pub fn run(&self, cwd: &Path) -> Result<()> {
        info!(command = %self.line, ?cwd, "running");
        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C");
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c");
            c
        };
        let status = command.arg(&self.line).current_dir(cwd).status()?;
        if !status.success() {
            return Err(Error::Io(std::io::Error::other(format!("`{}` exited with {status}", self.line))));
        }
        Ok(())
    }
}

const BUILD_RUNNER: &str = "flutter pub run build_runner build";

/// `build_runner` for the whole project, or only for the `.g.dart` output
/// of `file` when given.
pub fn build_runner(root: &Path, file: Option<&Path>) -> ToolCommand {
    let Some(file) = file else {
        return ToolCommand::new(format!("{BUILD_RUNNER} --delete-conflicting-outputs"));
    };
    let rel = file.strip_prefix(root).unwrap_or(file).to_string_lossy().replace('\\', "/");
    let filter = match rel.find(".dart") {
        Some(i) => format!("{}*.dart", &rel[..i]),
        None => rel,
    };
    ToolCommand::new(format!("{BUILD_RUNNER} --build-filter='{filter}'"))
}

pub fn pub_deps() -> ToolCommand {
    ToolCommand::new("flutter pub deps")
}

pub fn gen_l10n() -> ToolCommand {
    ToolCommand::new("flutter gen-l10n")
}
