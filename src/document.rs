//! Text buffers, positions and edits.
//!
//! Every mutation of Dart source goes through [`DocumentEditor::apply`],
//! which returns only once the edit is applied and persisted. Callers chain
//! dependent steps on that acknowledgement.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

// ————————————————————————————————————————————————————————————————————————————
// POSITIONS
// ————————————————————————————————————————————————————————————————————————————

/// Zero-based line and character (Unicode scalar) column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }

    pub fn translate(self, lines: isize, characters: isize) -> Self {
        Self {
            line: self.line.saturating_add_signed(lines),
            character: self.character.saturating_add_signed(characters),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub const fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn contains_range(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn intersects(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn shifted_lines(self, lines: usize) -> Self {
        Self {
            start: Position::new(self.start.line + lines, self.start.character),
            end: Position::new(self.end.line + lines, self.end.character),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct TextDocument {
    pub path: PathBuf,
    pub text: String,
}

impl TextDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Line text without its terminator; empty past the end.
    pub fn line(&self, n: usize) -> &str {
        self.text
            .split('\n')
            .nth(n)
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or("")
    }

    /// Byte offset of `pos`, clamped to the document and to the line end.
    pub fn offset_at(&self, pos: Position) -> usize {
        let mut line_start = 0;
        for (n, line) in self.text.split('\n').enumerate() {
            if n == pos.line {
                let content = line.strip_suffix('\r').unwrap_or(line);
                let col = content
                    .char_indices()
                    .nth(pos.character)
                    .map(|(i, _)| i)
                    .unwrap_or(content.len());
                return line_start + col;
            }
            line_start += line.len() + 1;
        }
        self.text.len()
    }

    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let before = &self.text[..floor_char_boundary(&self.text, offset)];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Position::new(line, before[line_start..].chars().count())
    }

    pub fn text_in(&self, range: Range) -> &str {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end).max(start);
        &self.text[start..end]
    }

    /// End of the document, the target of "append" insertions.
    pub fn end_position(&self) -> Position {
        self.position_at(self.text.len())
    }

    /// File name without any extension (`user.model.dart` → `user`).
    pub fn file_stem(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match name.find('.') {
            Some(i) => name[..i].to_string(),
            None => name,
        }
    }
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

// ————————————————————————————————————————————————————————————————————————————
// EDITS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self { range: Range::empty(at), new_text: text.into() }
    }

    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self { range, new_text: text.into() }
    }
}

/// Apply edits expressed against the same original text. Inserts at the same
/// position land in the order given.
pub fn apply_edits(doc: &TextDocument, edits: &[TextEdit]) -> String {
    let mut resolved: Vec<(usize, usize, usize, &str)> = edits
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let start = doc.offset_at(e.range.start);
            let end = doc.offset_at(e.range.end).max(start);
            (start, end, i, e.new_text.as_str())
        })
        .collect();
    resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.2.cmp(&a.2)));

    let mut text = doc.text.clone();
    for (start, end, _, new_text) in resolved {
        text.replace_range(start..end, new_text);
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub insert_spaces: bool,
    pub tab_size: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { insert_spaces: true, tab_size: 2 }
    }
}

/// Acknowledgement that an edit is applied and persisted.
#[derive(Debug, Clone)]
pub struct Applied {
    /// Text before the edits.
    pub before: TextDocument,
    /// Text after the edits, as persisted.
    pub document: TextDocument,
    pub edits: Vec<TextEdit>,
}

impl Applied {
    fn new(before: TextDocument, edits: Vec<TextEdit>) -> Self {
        let document = TextDocument::new(before.path.clone(), apply_edits(&before, &edits));
        Self { before, document, edits }
    }

    /// Where a position of the old text ended up. Inserts at the position
    /// itself push it forward; a position inside a replaced range stays put.
    pub fn map_position(&self, pos: Position) -> Position {
        let offset = self.before.offset_at(pos);
        let mut delta: isize = 0;
        for edit in &self.edits {
            let start = self.before.offset_at(edit.range.start);
            let end = self.before.offset_at(edit.range.end).max(start);
            if end <= offset && (start < offset || start == end) {
                delta += edit.new_text.len() as isize - (end - start) as isize;
            }
        }
        self.document.position_at(offset.saturating_add_signed(delta))
    }

    pub fn map_range(&self, range: Range) -> Range {
        Range::new(self.map_position(range.start), self.map_position(range.end))
    }
}

pub trait DocumentEditor {
    fn document(&self, path: &Path) -> Result<TextDocument>;

    fn apply(&mut self, path: &Path, edits: Vec<TextEdit>) -> Result<Applied>;

    /// Reformat the whole document and persist the result.
    fn format(&mut self, path: &Path, options: &FormatOptions) -> Result<Applied>;
}

pub trait Formatter {
    fn format(&self, path: &Path, source: &str, options: &FormatOptions) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, _path: &Path, source: &str, _options: &FormatOptions) -> Result<String> {
        Ok(source.to_string())
    }
}

/// Runs `dart format` in place. Indentation is dart's own, so the options
/// are only logged.
#[derive(Debug, Clone)]
pub struct DartFormatter {
    dart: PathBuf,
}

impl DartFormatter {
    /// Locate `dart` on PATH.
    pub fn discover() -> Option<Self> {
        which::which("dart").ok().map(|dart| Self { dart })
    }
}

impl Formatter for DartFormatter {
    fn format(&self, path: &Path, source: &str, options: &FormatOptions) -> Result<String> {
        debug!(?path, tab_size = options.tab_size, "running dart format");
        fs::write(path, source)?;
        let output = Command::new(&self.dart).arg("format").arg(path).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::Format(stderr));
        }
        Ok(fs::read_to_string(path)?)
    }
}

/// Edits files on disk; each apply is a read-modify-write.
pub struct FileEditor {
    formatter: Box<dyn Formatter>,
}

impl FileEditor {
    pub fn new(formatter: Box<dyn Formatter>) -> Self {
        Self { formatter }
    }
}

impl DocumentEditor for FileEditor {
    fn document(&self, path: &Path) -> Result<TextDocument> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        Ok(TextDocument::new(path, fs::read_to_string(path)?))
    }

    fn apply(&mut self, path: &Path, edits: Vec<TextEdit>) -> Result<Applied> {
        let applied = Applied::new(self.document(path)?, edits);
        fs::write(path, &applied.document.text)?;
        debug!(?path, edits = applied.edits.len(), "edits applied");
        Ok(applied)
    }

    fn format(&mut self, path: &Path, options: &FormatOptions) -> Result<Applied> {
        let doc = self.document(path)?;
        let text = match self.formatter.format(path, &doc.text, options) {
            Ok(text) => text,
            Err(err) => {
                // an unformatted document is still a valid result
                warn!(%err, "format failed, keeping unformatted text");
                doc.text.clone()
            }
        };
        fs::write(path, &text)?;
        Ok(Applied { before: doc, document: TextDocument::new(path, text), edits: Vec::new() })
    }
}

/// Buffers kept in memory, for hosts that own the real text.
#[derive(Debug, Default)]
pub struct MemoryEditor {
    buffers: HashMap<PathBuf, String>,
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.buffers.insert(path.into(), text.into());
    }

    pub fn text(&self, path: &Path) -> Option<&str> {
        self.buffers.get(path).map(String::as_str)
    }
}

impl DocumentEditor for MemoryEditor {
    fn document(&self, path: &Path) -> Result<TextDocument> {
        self.buffers
            .get(path)
            .map(|text| TextDocument::new(path, text.clone()))
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))
    }

    fn apply(&mut self, path: &Path, edits: Vec<TextEdit>) -> Result<Applied> {
        let applied = Applied::new(self.document(path)?, edits);
        self.buffers.insert(path.to_path_buf(), applied.document.text.clone());
        Ok(applied)
    }

    fn format(&mut self, path: &Path, _options: &FormatOptions) -> Result<Applied> {
        let doc = self.document(path)?;
        Ok(Applied { before: doc.clone(), document: doc, edits: Vec::new() })
    }
}
