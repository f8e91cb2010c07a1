//! Dart source emission for class descriptors.
//!
//! Output is plain text meant to be run through `dart format` afterwards;
//! members are indented two spaces so it reads fine without it.

use crate::ir::{ClassDescriptor, FieldDescriptor};

pub const INDENT: &str = "  ";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Which parts of a class to emit.
#[derive(Debug, Clone, Default)]
pub struct ClassEmit {
    pub doc_comments: bool,
    pub class_wrapper: bool,
    pub constructor: bool,
    pub serialization: bool,
    pub converters: Option<String>,
}

/// One constructor parameter, `required` when the field is non-nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorParam {
    pub name: String,
    pub required: bool,
}

impl CtorParam {
    pub fn optional(name: impl Into<String>) -> Self {
        Self { name: name.into(), required: false }
    }
}

/// Serialization members a class already has; those are not emitted again.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistingSerialization {
    pub from_json: bool,
    pub to_json: bool,
    pub from_json_list: bool,
}

/// Render one class (or only its members when `class_wrapper` is off).
pub fn class_source(class: &ClassDescriptor, opts: &ClassEmit) -> String {
    let mut sections: Vec<String> = Vec::new();

    if opts.constructor {
        let params: Vec<CtorParam> = class.field_names().map(CtorParam::optional).collect();
        sections.push(constructor(&class.name, &params));
    }

    let fields = class
        .fields
        .iter()
        .map(|f| field_declaration(f, opts.doc_comments))
        .collect::<Vec<_>>()
        .join("\n");
    if !fields.is_empty() {
        sections.push(fields);
    }

    if opts.serialization {
        let members = serialization_members(&class.name, ExistingSerialization::default());
        sections.push(members);
    }

    let body = indent(&sections.join("\n\n"));
    if !opts.class_wrapper {
        return body;
    }

    let mut out = String::new();
    if opts.serialization {
        out.push_str(&json_serializable_annotation(opts.converters.as_deref()));
        out.push('\n');
    }
    out.push_str(&format!("class {} {{\n{}\n}}", class.name, body));
    out
}

pub fn field_declaration(field: &FieldDescriptor, doc_comments: bool) -> String {
    let decl = format!("{} {};", field.ty.nullable(), field.name);
    match (&field.doc, doc_comments) {
        (Some(doc), true) => format!("{}\n{decl}", doc_comment(doc)),
        _ => decl,
    }
}

/// `///` lines for possibly multi-line doc text.
fn doc_comment(doc: &str) -> String {
    doc.lines()
        .map(|line| format!("/// {line}").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Name({this.a, required this.b,});`, or `Name();` with no parameters.
pub fn constructor(class_name: &str, params: &[CtorParam]) -> String {
    if params.is_empty() {
        return format!("{class_name}();");
    }
    let params = params
        .iter()
        .map(|p| {
            if p.required {
                format!("required this.{},", p.name)
            } else {
                format!("this.{},", p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{class_name}({{{params}}});")
}

/// `fromJson` factory, `toJson` and `fromJsonList` delegating to the
/// `_$<Class>FromJson` / `_$<Class>ToJson` hooks json_serializable generates.
pub fn serialization_members(class_name: &str, existing: ExistingSerialization) -> String {
    let mut members: Vec<String> = Vec::new();
    if !existing.from_json {
        members.push(format!(
            "factory {class_name}.fromJson(Map<String, dynamic> json) =>\n    _${class_name}FromJson(json);"
        ));
    }
    if !existing.to_json {
        members.push(format!(
            "Map<String, dynamic> toJson() => _${class_name}ToJson(this);"
        ));
    }
    if !existing.from_json_list {
        members.push(format!(
            "static List<{class_name}> fromJsonList(List<dynamic> json) => json\n    .map((e) => {class_name}.fromJson(e as Map<String, dynamic>))\n    .toList();"
        ));
    }
    members.join("\n\n")
}

pub fn json_serializable_annotation(converters: Option<&str>) -> String {
    match converters.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("@JsonSerializable(converters: {c})"),
        None => "@JsonSerializable()".to_string(),
    }
}

pub fn part_directive(file_stem: &str) -> String {
    format!("part '{file_stem}.g.dart';")
}

/// Indent every non-empty line by one level.
pub fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
