//! Boilerplate for classes that already exist in a Dart file.
//!
//! Everything here reads the class structure from an [`OutlineProvider`] and
//! writes through a [`DocumentEditor`]. When one command makes several
//! dependent edits, the outline taken before the first edit is rebased
//! through each [`Applied`] acknowledgement instead of being fetched again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codegen::{self, CtorParam, ExistingSerialization, INDENT};
use crate::document::{Applied, DocumentEditor, FormatOptions, Position, Range, TextDocument, TextEdit};
use crate::error::{Error, Result};
use crate::heuristics;
use crate::naming;
use crate::outline::{ElementKind, Outline, OutlineProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Getter,
    Setter,
    Both,
}

impl AccessorKind {
    pub fn label(self) -> &'static str {
        match self {
            AccessorKind::Getter => "Getter",
            AccessorKind::Setter => "Setter",
            AccessorKind::Both => "Getter and Setter",
        }
    }

    fn getter(self) -> bool {
        matches!(self, AccessorKind::Getter | AccessorKind::Both)
    }

    fn setter(self) -> bool {
        matches!(self, AccessorKind::Setter | AccessorKind::Both)
    }
}

/// Fields picked from one class together with the accessors it already has.
#[derive(Debug, Default)]
pub struct FieldGroup<'o> {
    pub fields: Vec<&'o Outline>,
    pub getters: HashSet<String>,
    pub setters: HashSet<String>,
}

pub struct ClassGen<'a> {
    outlines: &'a dyn OutlineProvider,
    editor: &'a mut dyn DocumentEditor,
    converters: Option<String>,
    snapshot: Option<(PathBuf, Outline)>,
}

impl<'a> ClassGen<'a> {
    pub fn new(outlines: &'a dyn OutlineProvider, editor: &'a mut dyn DocumentEditor) -> Self {
        Self { outlines, editor, converters: None, snapshot: None }
    }

    /// Expression for `@JsonSerializable(converters: ...)`.
    pub fn with_converters(mut self, converters: Option<String>) -> Self {
        self.converters = converters;
        self
    }

    pub fn editor(&mut self) -> &mut dyn DocumentEditor {
        &mut *self.editor
    }

    /// Outline for `path`, rebased through this session's edits if any.
    pub fn outline(&self, path: &Path) -> Result<Outline> {
        match &self.snapshot {
            Some((p, outline)) if p == path => Ok(outline.clone()),
            _ => self.outlines.outline(path),
        }
    }

    /// Keep `outline` as the current structure of `path` for later steps.
    pub fn remember(&mut self, path: &Path, outline: Outline) {
        self.snapshot = Some((path.to_path_buf(), outline));
    }

    /// Apply `edits`; `outline`, if given, is rebased and remembered.
    pub fn apply(&mut self, path: &Path, outline: Option<&Outline>, edits: Vec<TextEdit>) -> Result<Applied> {
        let applied = self.editor.apply(path, edits)?;
        self.snapshot = outline.map(|o| (path.to_path_buf(), o.rebased(&|r| applied.map_range(r))));
        Ok(applied)
    }

    // ————————————————————————————————————————————————————————————————————————
    // CONSTRUCTOR
    // ————————————————————————————————————————————————————————————————————————

    /// Insert `Name({this.a, required this.b,});` after the class's `{`.
    /// Nothing happens when the class already has an unnamed constructor.
    pub fn generate_constructor(&mut self, path: &Path, selection: Range) -> Result<Option<Applied>> {
        let outline = self.outline(path)?;
        let class = class_at(&outline, selection)?;
        let name = class.name();

        if class
            .children_of_kind(ElementKind::Constructor)
            .any(|c| c.name() == name)
        {
            debug!(class = name, "unnamed constructor exists, skipping");
            return Ok(None);
        }

        let params: Vec<CtorParam> = class
            .children_of_kind(ElementKind::Field)
            .map(|f| CtorParam {
                name: f.name().to_string(),
                required: is_non_nullable(f.element.return_type.as_deref()),
            })
            .collect();
        let text = format!("\n{INDENT}{}\n", codegen::constructor(name, &params));

        let doc = self.editor.document(path)?;
        let at = after_open_brace(&doc, class);
        info!(class = name, params = params.len(), "generating constructor");
        let applied = self.apply(path, Some(&outline), vec![TextEdit::insert(at, text)])?;
        Ok(Some(applied))
    }

    // ————————————————————————————————————————————————————————————————————————
    // SERIALIZATION
    // ————————————————————————————————————————————————————————————————————————

    /// Constructor first, then `fromJson` / `toJson` / `fromJsonList`, the
    /// `@JsonSerializable` annotation and the `part` directive, each step
    /// started only after the previous one was acknowledged.
    pub fn generate_serialization(&mut self, path: &Path, selection: Range) -> Result<Vec<Applied>> {
        let mut steps = Vec::new();
        let mut selection = selection;

        if let Some(applied) = self.generate_constructor(path, selection)? {
            selection = applied.map_range(selection);
            steps.push(applied);
        }
        if let Some(applied) = self.generate_serialization_members(path, selection)? {
            steps.push(applied);
        }
        if let Some(applied) = self.ensure_part_directive(path)? {
            steps.push(applied);
        }
        Ok(steps)
    }

    fn generate_serialization_members(&mut self, path: &Path, selection: Range) -> Result<Option<Applied>> {
        let outline = self.outline(path)?;
        let class = class_at(&outline, selection)?;
        let name = class.name();
        let doc = self.editor.document(path)?;

        let mut existing = ExistingSerialization::default();
        for child in &class.children {
            match (child.kind(), child.name()) {
                (ElementKind::Method, "toJson") => existing.to_json = true,
                (ElementKind::Method, "fromJsonList") => existing.from_json_list = true,
                (ElementKind::Constructor, n) if n == format!("{name}.fromJson") || n == "fromJson" => {
                    existing.from_json = true
                }
                _ => {}
            }
        }

        let mut edits = Vec::new();
        let members = codegen::serialization_members(name, existing);
        if !members.is_empty() {
            let at = before_close_brace(class);
            edits.push(TextEdit::insert(at, format!("\n{}\n", codegen::indent(&members))));
        }

        let header_line = class.code_range.start.line;
        let preceding = header_line.checked_sub(1).map(|l| doc.line(l)).unwrap_or("");
        let class_text = doc.text_in(class.code_range);
        if !heuristics::has_json_serializable_annotation(class_text)
            && !heuristics::has_json_serializable_annotation(preceding)
        {
            let annotation = codegen::json_serializable_annotation(self.converters.as_deref());
            edits.push(TextEdit::insert(Position::new(header_line, 0), format!("{annotation}\n")));
        }

        if edits.is_empty() {
            debug!(class = name, "serialization already complete");
            return Ok(None);
        }
        info!(class = name, "generating serialization members");
        Ok(Some(self.apply(path, Some(&outline), edits)?))
    }

    /// Add `part '<stem>.g.dart';` after the last import, or at the top.
    pub fn ensure_part_directive(&mut self, path: &Path) -> Result<Option<Applied>> {
        let doc = self.editor.document(path)?;
        let stem = doc.file_stem();
        if heuristics::has_part_directive(&doc.text, &stem) {
            return Ok(None);
        }
        let part = codegen::part_directive(&stem);
        let edit = match heuristics::last_import_statement_range(&doc.text) {
            Some(import) => TextEdit::insert(doc.position_at(import.end), format!("\n\n{part}")),
            None => TextEdit::insert(Position::new(0, 0), format!("{part}\n\n")),
        };
        let outline = self.outline(path).ok();
        debug!(?path, %part, "adding part directive");
        Ok(Some(self.apply(path, outline.as_ref(), vec![edit])?))
    }

    // ————————————————————————————————————————————————————————————————————————
    // ACCESSORS
    // ————————————————————————————————————————————————————————————————————————

    /// Privatize the selected fields and add the missing accessors, one
    /// applied step per field.
    pub fn generate_accessors(&mut self, path: &Path, selection: Range, kind: AccessorKind) -> Result<Vec<Applied>> {
        let outline = self.outline(path)?;
        let mut doc = self.editor.document(path)?;
        let groups = chosen_fields(&outline, &doc, selection);
        if groups.iter().all(|g| g.fields.is_empty()) {
            return Err(Error::NoFieldsSelected(kind.label()));
        }

        let mut steps: Vec<Applied> = Vec::new();
        let mut inserted = 0usize;
        for group in &groups {
            for field in &group.fields {
                let name = field.name();
                let public = naming::public_name(name);
                let want_getter = kind.getter() && !group.getters.contains(public);
                let want_setter = kind.setter() && !group.setters.contains(public);
                if !want_getter && !want_setter {
                    debug!(field = name, "accessors exist, skipping");
                    continue;
                }

                let storage = naming::private_name(public);
                let ty = field.element.return_type.as_deref().unwrap_or("").trim();
                let indent: String = doc
                    .line(field.code_range.start.line + inserted)
                    .chars()
                    .take_while(|c| c.is_whitespace())
                    .collect();

                let mut edits = Vec::new();
                if !naming::is_private(name) {
                    edits.push(TextEdit::replace(field.range.shifted_lines(inserted), storage.clone()));
                }

                let mut text = String::new();
                if want_getter {
                    text.push_str(&format!("{indent}{}\n", getter_source(ty, public, &storage)));
                }
                if want_setter {
                    text.push_str(&format!("{indent}{}\n", setter_source(ty, public, &storage)));
                }
                let lines = text.lines().count();

                let line = field.code_range.end.line + inserted + 1;
                let edit = if line < doc.line_count() {
                    TextEdit::insert(Position::new(line, 0), text)
                } else {
                    TextEdit::insert(doc.end_position(), format!("\n{}", text.trim_end()))
                };
                edits.push(edit);

                let applied = self.editor.apply(path, edits)?;
                doc = applied.document.clone();
                inserted += lines;
                steps.push(applied);
            }
        }

        drop(groups);
        let mut rebased = outline;
        for step in &steps {
            rebased = rebased.rebased(&|r| step.map_range(r));
        }
        self.snapshot = Some((path.to_path_buf(), rebased));
        Ok(steps)
    }

    /// Reformat once the command's edits are in; the outline is stale after.
    pub fn finish(&mut self, path: &Path, options: &FormatOptions) -> Result<Applied> {
        self.snapshot = None;
        self.editor.format(path, options)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Top-level class whose declaration contains the whole selection.
pub fn class_at(outline: &Outline, selection: Range) -> Result<&Outline> {
    outline
        .top_level()
        .iter()
        .find(|o| o.kind().is_class_like() && o.code_range.contains_range(&selection))
        .ok_or(Error::NoClassAtCursor)
}

/// Fields touched by the selection. A class containing the selection
/// contributes the fields intersecting it; a class inside the selection
/// contributes all of its fields.
pub fn chosen_fields<'o>(outline: &'o Outline, doc: &TextDocument, selection: Range) -> Vec<FieldGroup<'o>> {
    let mut out = Vec::new();
    collect_fields(outline.top_level(), doc, selection, true, &mut out);
    out
}

fn collect_fields<'o>(
    nodes: &'o [Outline],
    doc: &TextDocument,
    selection: Range,
    by_range: bool,
    out: &mut Vec<FieldGroup<'o>>,
) {
    let mut group = FieldGroup::default();
    let mut nested = Vec::new();
    for node in nodes {
        match node.kind() {
            ElementKind::Field => {
                if !by_range || node.code_range.intersects(&selection) {
                    group.fields.push(node);
                }
            }
            ElementKind::Getter => {
                group.getters.insert(node.name().to_string());
            }
            ElementKind::Setter => {
                group.setters.insert(node.name().to_string());
            }
            ElementKind::Method => {
                let text = doc.text_in(node.code_range);
                if let Some(name) = heuristics::getter_name(text) {
                    group.getters.insert(name);
                } else if let Some(name) = heuristics::setter_name(text) {
                    group.setters.insert(name);
                }
            }
            kind if kind.is_class_like() => {
                if node.code_range.contains_range(&selection) {
                    collect_fields(&node.children, doc, selection, true, &mut nested);
                } else if selection.contains_range(&node.code_range) {
                    collect_fields(&node.children, doc, selection, false, &mut nested);
                }
            }
            _ => {}
        }
    }
    if !group.fields.is_empty() {
        out.push(group);
    }
    out.extend(nested);
}

pub fn getter_source(ty: &str, public: &str, storage: &str) -> String {
    format!("{ty} get {public} => {storage};").trim_start().to_string()
}

pub fn setter_source(ty: &str, public: &str, storage: &str) -> String {
    let param = if ty.is_empty() { "value".to_string() } else { format!("{ty} value") };
    format!("set {public}({param}) {{ {storage} = value; }}")
}

fn is_non_nullable(return_type: Option<&str>) -> bool {
    match return_type.map(str::trim) {
        Some(ty) if !ty.is_empty() => !ty.ends_with('?') && ty != "dynamic",
        _ => false,
    }
}

pub(crate) fn after_open_brace(doc: &TextDocument, class: &Outline) -> Position {
    let text = doc.text_in(class.code_range);
    match text.find('{') {
        Some(i) => doc.position_at(doc.offset_at(class.code_range.start) + i + 1),
        None => before_close_brace(class),
    }
}

fn before_close_brace(class: &Outline) -> Position {
    class.code_range.end.translate(0, -1)
}
