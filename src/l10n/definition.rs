//! Navigation between `S.current.<key>` references, ARB entries and the
//! generated localization getters.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::arb;
use super::config::L10nConfig;
use crate::document::Position;
use crate::error::Result;
use crate::heuristics;

const GETTER_PREFIX: &str = "String get ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub position: Position,
}

/// Lookups over one project's ARB files. The ARB listing is cached per
/// ARB directory until [`L10nDefinitions::invalidate`].
#[derive(Debug)]
pub struct L10nDefinitions {
    config: L10nConfig,
    arb_files: HashMap<PathBuf, Vec<PathBuf>>,
}

impl L10nDefinitions {
    pub fn new(config: L10nConfig) -> Self {
        Self { config, arb_files: HashMap::new() }
    }

    /// Forget cached listings, e.g. after ARB files were added or removed.
    pub fn invalidate(&mut self) {
        self.arb_files.clear();
    }

    /// ARB files with the template first.
    pub fn arb_files(&mut self) -> Result<&[PathBuf]> {
        let dir = self.config.arb_dir_path();
        if !self.arb_files.contains_key(&dir) {
            let template = self.config.template_path();
            let mut files = arb::list_arb_files(&dir)?;
            if let Some(i) = files.iter().position(|p| *p == template) {
                let t = files.remove(i);
                files.insert(0, t);
            }
            debug!(?dir, count = files.len(), "arb files listed");
            self.arb_files.insert(dir.clone(), files);
        }
        Ok(self.arb_files.get(&dir).map(Vec::as_slice).unwrap_or_default())
    }

    /// ARB entries for the `S.current.key` / `S.of(context).key` under
    /// `column`.
    pub fn definition(&mut self, line: &str, column: usize) -> Result<Vec<Location>> {
        let Some((key, _)) = heuristics::l10n_reference_at(line, column) else {
            return Ok(Vec::new());
        };
        let files = self.arb_files()?.to_vec();
        Ok(locations_in(&files, &key, None))
    }

    /// From an ARB line: the `String get <key>` declaration in the generated
    /// localization file, then the same key in the other ARB files.
    pub fn references(&mut self, arb_path: &Path, line: &str) -> Result<Vec<Location>> {
        let Some(key) = arb::key_on_line(line) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        let output = self.config.output_file_path();
        match fs::read_to_string(&output) {
            Ok(text) => out.extend(getter_location(&output, &text, &key)),
            Err(err) => {
                debug!(?output, %err, "no generated localization file");
                return Ok(out);
            }
        }
        let files = self.arb_files()?.to_vec();
        out.extend(locations_in(&files, &key, Some(arb_path)));
        Ok(out)
    }
}

fn getter_location(path: &Path, text: &str, key: &str) -> Option<Location> {
    let wanted = format!("{GETTER_PREFIX}{key}");
    text.lines().enumerate().find_map(|(n, line)| {
        let at = line.find(&wanted)?;
        let column = line[..at].chars().count() + GETTER_PREFIX.len() + 1;
        Some(Location { path: path.to_path_buf(), position: Position::new(n, column) })
    })
}

fn locations_in(files: &[PathBuf], key: &str, skip: Option<&Path>) -> Vec<Location> {
    let mut out = Vec::new();
    for file in files {
        if skip.is_some_and(|s| s == file) {
            continue;
        }
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) => {
                warn!(?file, %err, "skipping unreadable arb file");
                continue;
            }
        };
        out.extend(
            arb::key_locations(&text, key)
                .into_iter()
                .map(|position| Location { path: file.clone(), position }),
        );
    }
    out
}
