//! The JSON-to-Dart command.
//!
//! With the selection inside a class, the JSON's fields are added to that
//! class and its constructor/serialization are brought up to date. Otherwise
//! a new class is appended to the file. Nested classes are appended either
//! way.

use std::path::Path;

use tracing::{debug, info};

use crate::classgen::{self, ClassGen};
use crate::document::{Applied, Position, Range, TextDocument, TextEdit};
use crate::error::{Error, Result};
use crate::inference;
use crate::ir::FieldDescriptor;
use crate::naming;
use crate::outline::{Element, ElementKind, Outline};
use crate::settings::Settings;
use crate::synth::{self, SynthOptions};

#[derive(Debug, Clone)]
pub struct JsonToDart<'r> {
    pub path: &'r Path,
    pub selection: Range,
    pub json: &'r str,
    /// Name for a new class, before the configured suffix. Unused when the
    /// selection is inside a class.
    pub class_name: Option<&'r str>,
}

impl JsonToDart<'_> {
    pub fn run(&self, generator: &mut ClassGen<'_>, settings: &Settings) -> Result<Vec<Applied>> {
        let root = synth::parse_root(self.json)?;
        let outline = match generator.outline(self.path) {
            Ok(outline) => Some(outline),
            Err(Error::OutlineUnavailable(path)) => {
                debug!(?path, "no outline, treating the file as having no classes");
                None
            }
            Err(err) => return Err(err),
        };

        let target = outline
            .as_ref()
            .and_then(|o| classgen::class_at(o, self.selection).ok());
        match (outline.as_ref(), target) {
            (Some(outline), Some(class)) => {
                let class = class.clone();
                self.fill_class(generator, settings, outline, &class, &root)
            }
            _ => self.new_class(generator, settings, outline.as_ref(), &root),
        }
    }

    fn new_class(
        &self,
        generator: &mut ClassGen<'_>,
        settings: &Settings,
        outline: Option<&Outline>,
        root: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Vec<Applied>> {
        let name = self.class_name.map(str::trim).unwrap_or_default();
        if !naming::is_dart_class_name(name) {
            return Err(Error::InvalidClassName(name.to_string()));
        }
        let full = format!("{name}{}", settings.class_suffix);
        if outline.is_some_and(|o| o.has_class_named(&full)) {
            return Err(Error::DuplicateClassName(full));
        }

        let options = settings.synth_options();
        let run = synth::synthesize_all(root, &full, &options);
        let needs_part = options.emit_serialization || !run.nested.is_empty();
        info!(class = %full, nested = run.nested.len(), "creating class from json");

        let mut steps = vec![append(generator, self.path, &run.into_source())?];
        if needs_part {
            steps.extend(generator.ensure_part_directive(self.path)?);
        }
        Ok(steps)
    }

    fn fill_class(
        &self,
        generator: &mut ClassGen<'_>,
        settings: &Settings,
        outline: &Outline,
        class: &Outline,
        root: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Vec<Applied>> {
        let options = SynthOptions {
            emit_class: false,
            emit_constructor: false,
            emit_serialization: false,
            ..settings.synth_options()
        };
        let run = synth::synthesize_all(root, class.name(), &options);
        let (descriptor, _) = inference::observe_object(root, class.name(), &options.class_suffix);
        info!(class = class.name(), fields = descriptor.fields.len(), "adding json fields to class");

        let doc = generator.editor().document(self.path)?;
        let edit = field_insertion(&doc, class, &run.root);
        let first_line = edit.range.start.line;
        let applied = generator.apply(self.path, Some(outline), vec![edit])?;

        // the new fields are not in any outline yet
        let mut rebased = generator.outline(self.path)?;
        register_fields(&mut rebased, &applied, class.name(), first_line, &descriptor.fields);
        generator.remember(self.path, rebased);

        let selection = applied.map_range(self.selection);
        let mut steps = vec![applied];
        if settings.gen_serialization {
            steps.extend(generator.generate_serialization(self.path, selection)?);
        } else if settings.gen_constructor {
            steps.extend(generator.generate_constructor(self.path, selection)?);
        }

        if !run.nested.is_empty() {
            steps.push(append(generator, self.path, &run.nested_source())?);
            steps.extend(generator.ensure_part_directive(self.path)?);
        }
        Ok(steps)
    }
}

/// Where fields go in an existing class: after the last field, else after
/// the constructor, else right after `{`.
fn field_insertion(doc: &TextDocument, class: &Outline, body: &str) -> TextEdit {
    if let Some(field) = class.children_of_kind(ElementKind::Field).last() {
        let at = Position::new(field.code_range.end.line + 1, 0);
        return TextEdit::insert(at, format!("{body}\n"));
    }
    if let Some(ctor) = class.children_of_kind(ElementKind::Constructor).last() {
        return TextEdit::insert(ctor.code_range.end, format!("\n{body}"));
    }
    let at = classgen::after_open_brace(doc, class);
    if at.line == class.code_range.end.line {
        TextEdit::insert(at, format!("\n{body}\n"))
    } else {
        TextEdit::insert(at, format!("\n{body}"))
    }
}

/// Add outline nodes for fields just written into `class_name`, found by
/// their declaration text from `from_line` on.
fn register_fields(outline: &mut Outline, applied: &Applied, class_name: &str, from_line: usize, fields: &[FieldDescriptor]) {
    let Some(class) = outline
        .children
        .iter_mut()
        .find(|o| o.kind().is_class_like() && o.name() == class_name)
    else {
        return;
    };

    let doc = &applied.document;
    let mut line = from_line;
    for field in fields {
        let ty = field.ty.nullable();
        let decl = format!("{ty} {};", field.name);
        while line < doc.line_count() && doc.line(line).trim() != decl {
            line += 1;
        }
        if line >= doc.line_count() {
            break;
        }
        let text = doc.line(line);
        let indent = text.chars().take_while(|c| c.is_whitespace()).count();
        let name_col = indent + ty.chars().count() + 1;
        let name_len = field.name.chars().count();
        class.children.push(Outline {
            element: Element {
                kind: ElementKind::Field,
                name: field.name.clone(),
                return_type: Some(ty),
                parameters: None,
            },
            range: Range::new(Position::new(line, name_col), Position::new(line, name_col + name_len)),
            code_range: Range::new(Position::new(line, indent), Position::new(line, text.chars().count())),
            children: Vec::new(),
        });
        line += 1;
    }
    class.children.sort_by_key(|c| c.code_range.start);
}

fn append(generator: &mut ClassGen<'_>, path: &Path, source: &str) -> Result<Applied> {
    let doc = generator.editor().document(path)?;
    let prefix = match doc.text.as_str() {
        "" => "",
        t if t.ends_with('\n') => "\n",
        _ => "\n\n",
    };
    let outline = generator.outline(path).ok();
    let edit = TextEdit::insert(doc.end_position(), format!("{prefix}{source}\n"));
    generator.apply(path, outline.as_ref(), vec![edit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryEditor;
    use crate::outline::OutlineProvider;
    use crate::outline::fixtures::{node, range, unit};

    struct Fixed(Option<Outline>);

    impl OutlineProvider for Fixed {
        fn outline(&self, path: &Path) -> Result<Outline> {
            self.0.clone().ok_or_else(|| Error::OutlineUnavailable(path.to_path_buf()))
        }
    }

    const IMPORT: &str = "import 'package:json_annotation/json_annotation.dart';\n";

    fn request<'r>(path: &'r Path, json: &'r str, name: Option<&'r str>) -> JsonToDart<'r> {
        JsonToDart { path, selection: Range::empty(Position::new(0, 0)), json, class_name: name }
    }

    #[test]
    fn new_class_appended_with_part_directive() {
        let provider = Fixed(Some(unit(vec![])));
        let mut editor = MemoryEditor::new();
        editor.open("lib/user.dart", IMPORT);
        let path = Path::new("lib/user.dart");
        let json = r#"{"name": "Ann", "profile": {"age": 3}}"#;
        {
            let mut generator = ClassGen::new(&provider, &mut editor);
            let steps = request(path, json, Some("User")).run(&mut generator, &Settings::default()).unwrap();
            assert_eq!(steps.len(), 2);
        }
        let text = editor.text(path).unwrap();
        assert!(text.starts_with(
            "import 'package:json_annotation/json_annotation.dart';\n\npart 'user.g.dart';\n\n@JsonSerializable()\nclass User {\n"
        ));
        assert!(text.contains("  User({this.name, this.profile,});"));
        assert!(text.contains("  /// Ann\n  String? name;"));
        assert!(text.contains("}\n\n@JsonSerializable()\nclass Profile {\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn plain_class_without_outline() {
        let provider = Fixed(None);
        let mut editor = MemoryEditor::new();
        editor.open("a.dart", "");
        let settings = Settings {
            gen_doc: false,
            gen_constructor: false,
            gen_serialization: false,
            ..Settings::default()
        };
        let path = Path::new("a.dart");
        let mut generator = ClassGen::new(&provider, &mut editor);
        let steps = request(path, r#"[{"id": 1}, {"other": true}]"#, Some("Item")).run(&mut generator, &settings).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(editor.text(path), Some("class Item {\n  int? id;\n}\n"));
    }

    #[test]
    fn name_rules() {
        let user = node(ElementKind::Class, "UserEntity", None, range(0, 6, 0, 16), range(0, 0, 0, 19));
        let provider = Fixed(Some(unit(vec![user])));
        let mut editor = MemoryEditor::new();
        editor.open("a.dart", "class UserEntity {}\n");
        let settings = Settings { class_suffix: "Entity".into(), ..Settings::default() };
        let path = Path::new("a.dart");
        let selection = Range::empty(Position::new(1, 0));
        let mut generator = ClassGen::new(&provider, &mut editor);

        let req = JsonToDart { path, selection, json: r#"{"a": 1}"#, class_name: Some("User") };
        assert!(matches!(req.run(&mut generator, &settings), Err(Error::DuplicateClassName(n)) if n == "UserEntity"));

        let req = JsonToDart { class_name: Some("user"), ..req };
        assert!(matches!(req.run(&mut generator, &settings), Err(Error::InvalidClassName(_))));

        let req = JsonToDart { class_name: None, ..req };
        assert!(matches!(req.run(&mut generator, &settings), Err(Error::InvalidClassName(_))));

        let req = JsonToDart { json: "{}", ..req };
        assert!(matches!(req.run(&mut generator, &settings), Err(Error::EmptyJson)));
    }

    #[test]
    fn fills_selected_class_then_regenerates_constructor() {
        let mut class = node(ElementKind::Class, "User", None, range(0, 6, 0, 10), range(0, 0, 2, 1));
        class.children = vec![node(ElementKind::Field, "id", Some("int?"), range(1, 7, 1, 9), range(1, 2, 1, 10))];
        let provider = Fixed(Some(unit(vec![class])));
        let mut editor = MemoryEditor::new();
        editor.open("user.dart", "class User {\n  int? id;\n}\n");
        let settings = Settings { gen_doc: false, gen_serialization: false, ..Settings::default() };
        let path = Path::new("user.dart");
        {
            let mut generator = ClassGen::new(&provider, &mut editor);
            let req = JsonToDart {
                path,
                selection: Range::empty(Position::new(1, 3)),
                json: r#"{"name": "x"}"#,
                class_name: None,
            };
            let steps = req.run(&mut generator, &settings).unwrap();
            assert_eq!(steps.len(), 2);
        }
        assert_eq!(
            editor.text(path),
            Some("class User {\n  User({this.id, this.name,});\n\n  int? id;\n  String? name;\n}\n")
        );
    }

    #[test]
    fn filling_with_nested_objects_appends_their_classes() {
        let class = node(ElementKind::Class, "Order", None, range(0, 6, 0, 11), range(0, 0, 0, 14));
        let provider = Fixed(Some(unit(vec![class])));
        let mut editor = MemoryEditor::new();
        editor.open("order.dart", "class Order {}\n");
        let settings = Settings { gen_doc: false, gen_serialization: false, gen_constructor: false, ..Settings::default() };
        let path = Path::new("order.dart");
        {
            let mut generator = ClassGen::new(&provider, &mut editor);
            let req = JsonToDart {
                path,
                selection: Range::empty(Position::new(0, 3)),
                json: r#"{"item": {"sku": "a"}}"#,
                class_name: None,
            };
            req.run(&mut generator, &settings).unwrap();
        }
        let text = editor.text(path).unwrap();
        assert!(text.starts_with("part 'order.g.dart';\n\nclass Order {\n  Item? item;\n}\n"));
        assert!(text.contains("@JsonSerializable()\nclass Item {\n  Item({this.sku,});"));
    }
}
