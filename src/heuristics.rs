//! Regex heuristics over Dart source text.
//!
//! None of this parses Dart. Each predicate recovers one structural fact by
//! pattern matching, and callers go through these names only, so any of them
//! can be replaced by a real parse without touching call sites.
//!
//! Columns are character columns within a single line; offsets are byte
//! offsets within a whole text.

use std::ops::Range as ByteRange;

use once_cell::sync::Lazy;
use regex::Regex;

static IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bimport\b[\S\s]*?;").expect("import regex"));

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((\\")|[^"])*"|'((\\')|[^'])*'"#).expect("string literal regex"));

static L10N_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"S\s*\.\s*(of\(.*?\)|current)\s*\.\s*[a-zA-Z_][a-zA-Z_0-9]*").expect("l10n reference regex")
});

static GETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:@\w+(?:\(.*?\))?\s+)*(?:(?:static|external)\s+)*(?:[\w$<>?,\[\]\s]+?\s+)?get\s+([A-Za-z_$][\w$]*)\s*(?:=>|\{|async\b)")
        .expect("getter regex")
});

static SETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:@\w+(?:\(.*?\))?\s+)*(?:(?:static|external)\s+)*(?:void\s+)?set\s+([A-Za-z_$][\w$]*)\s*\(")
        .expect("setter regex")
});

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"'.*'|".*""#).expect("quoted regex"));

static PAGE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"page:\s*\([\s\S]*?\)\s*=>\s*([A-Za-z_$][\w$.]*)").expect("page param regex"));

/// Span of a match on one line, in character columns, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    fn from_bytes(line: &str, range: ByteRange<usize>) -> Self {
        Self {
            start: line[..range.start].chars().count(),
            end: line[..range.end].chars().count(),
        }
    }

    /// Cursor touches the span, both ends included.
    pub fn touches(&self, column: usize) -> bool {
        self.start <= column && column <= self.end
    }
}

/// A quoted literal found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralMatch {
    /// Span including the quotes.
    pub span: Span,
    /// Text between the quotes, escapes untouched.
    pub inner: String,
}

impl LiteralMatch {
    /// Span of the contents, quotes excluded.
    pub fn inner_span(&self) -> Span {
        Span {
            start: self.span.start + 1,
            end: self.span.end.saturating_sub(1),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

pub fn is_getter_declaration(text: &str) -> bool {
    getter_name(text).is_some()
}

pub fn getter_name(text: &str) -> Option<String> {
    GETTER.captures(text).map(|c| c[1].to_string())
}

pub fn is_setter_declaration(text: &str) -> bool {
    setter_name(text).is_some()
}

pub fn setter_name(text: &str) -> Option<String> {
    SETTER.captures(text).map(|c| c[1].to_string())
}

/// Byte range of the last `import ...;` statement.
pub fn last_import_statement_range(text: &str) -> Option<ByteRange<usize>> {
    IMPORT.find_iter(text).last().map(|m| m.range())
}

/// `part '<stem>.g.dart';` with either quote style.
pub fn has_part_directive(text: &str, file_stem: &str) -> bool {
    let single = format!("part '{file_stem}.g.dart'");
    let double = format!("part \"{file_stem}.g.dart\"");
    text.contains(&single) || text.contains(&double)
}

pub fn has_json_serializable_annotation(text: &str) -> bool {
    text.contains("@JsonSerializable")
}

// ————————————————————————————————————————————————————————————————————————————
// CURSOR LOOKUPS
// ————————————————————————————————————————————————————————————————————————————

/// String literal under `column` on `line`.
pub fn string_literal_at(line: &str, column: usize) -> Option<LiteralMatch> {
    string_literals(line).into_iter().find(|m| m.span.touches(column))
}

pub fn string_literals(line: &str) -> Vec<LiteralMatch> {
    STRING_LITERAL
        .find_iter(line)
        .map(|m| {
            let raw = m.as_str();
            LiteralMatch {
                span: Span::from_bytes(line, m.range()),
                inner: raw[1..raw.len() - 1].to_string(),
            }
        })
        .collect()
}

/// `S.current.key` or `S.of(context).key` under `column`; returns the key.
pub fn l10n_reference_at(line: &str, column: usize) -> Option<(String, Span)> {
    reference_at(&L10N_REFERENCE, line, column)
}

/// `<class>.name` under `column`, e.g. `Images.logo`; returns the member.
pub fn image_reference_at(line: &str, column: usize, class_name: &str) -> Option<(String, Span)> {
    let pattern = format!(r"{}\s*\.\s*[a-zA-Z_][a-zA-Z_0-9]*", regex::escape(class_name));
    let regex = Regex::new(&pattern).ok()?;
    reference_at(&regex, line, column)
}

/// Quoted text under `column`, greedy to the last quote of the same kind,
/// with every quote character removed.
pub fn quoted_value_at(line: &str, column: usize) -> Option<String> {
    QUOTED.find_iter(line).find_map(|m| {
        let span = Span::from_bytes(line, m.range());
        if !span.touches(column) {
            return None;
        }
        let value = m.as_str().replace(['"', '\''], "").trim().to_string();
        (!value.is_empty()).then_some(value)
    })
}

fn reference_at(regex: &Regex, line: &str, column: usize) -> Option<(String, Span)> {
    regex.find_iter(line).find_map(|m| {
        let span = Span::from_bytes(line, m.range());
        if !span.touches(column) {
            return None;
        }
        let member = m.as_str().rsplit('.').next()?.trim().to_string();
        Some((member, span))
    })
}

// ————————————————————————————————————————————————————————————————————————————
// FILE SCANS
// ————————————————————————————————————————————————————————————————————————————

/// Values of `static String get <name> => '<value>'` declarations.
pub fn static_string_getter_values(text: &str, name: &str) -> Vec<String> {
    let pattern = format!(
        r#"static\s+String\s+get\s+{}\s*=>\s*('.*'|".*")"#,
        regex::escape(name)
    );
    let Ok(regex) = Regex::new(&pattern) else {
        return Vec::new();
    };
    regex
        .captures_iter(text)
        .filter_map(|c| {
            let value = c[1].replace(['"', '\''], "").trim().to_string();
            (!value.is_empty()).then_some(value)
        })
        .collect()
}

/// Byte offsets of `GetPage(name: '<page>', ...),` entries.
pub fn get_page_entries(text: &str, page: &str) -> Vec<(usize, String)> {
    let page = regex::escape(page);
    let pattern = format!(r#"GetPage\s*?\(\s*?name\s*?:\s*?('{page}'|"{page}")[\s\S]*?\),"#);
    let Ok(regex) = Regex::new(&pattern) else {
        return Vec::new();
    };
    regex
        .find_iter(text)
        .map(|m| (m.start(), m.as_str().to_string()))
        .collect()
}

/// Target of a `page: () => Target(...)` argument.
pub fn page_builder_target(entry: &str) -> Option<String> {
    PAGE_PARAM.captures(entry).map(|c| c[1].to_string())
}

pub fn is_get_page_list_type(return_type: &str) -> bool {
    return_type.trim_start().starts_with("List<GetPage")
}
