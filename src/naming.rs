//! Dart identifier helpers.
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper-case first letter, then letters/digits, with single underscores
/// between segments and no trailing underscore.
static CLASS_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*(_[A-Za-z0-9]+)*$").expect("class name regex"));

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex"));

pub const PRIVATE_MARKER: char = '_';

/// Camel-case `s`, splitting on `_`, `-` and whitespace. Characters inside a
/// segment keep their case; only segment heads are touched.
pub fn camel_case(s: &str, upper_first: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let segments = s
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|seg| !seg.is_empty());
    for (i, seg) in segments.enumerate() {
        let mut chars = seg.chars();
        let Some(head) = chars.next() else { continue };
        if i == 0 && !upper_first {
            out.extend(head.to_lowercase());
        } else {
            out.extend(head.to_uppercase());
        }
        out.push_str(chars.as_str());
    }
    out
}

/// Type name for a nested object found under `key`.
pub fn type_name_for_key(key: &str, suffix: &str) -> String {
    camel_case(&format!("{key}{suffix}"), true)
}

/// Field identifier for a nested object found under `key`.
pub fn field_name_for_key(key: &str) -> String {
    camel_case(key, false)
}

pub fn is_dart_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub fn is_dart_class_name(name: &str) -> bool {
    CLASS_NAME.is_match(name)
}

/// Split the `"dataList (工序列表)"` convention into the bare key and its
/// annotation. Keys without a parenthesized part come back unchanged.
pub fn split_annotated_key(key: &str) -> (String, Option<String>) {
    let (Some(open), Some(close)) = (key.find('('), key.rfind(')')) else {
        return (key.to_string(), None);
    };
    if close < open {
        return (key.to_string(), None);
    }
    let bare: String = key[..open].chars().filter(|c| !c.is_whitespace()).collect();
    let doc = key[open + 1..close].trim();
    let doc = if doc.is_empty() { None } else { Some(doc.to_string()) };
    (bare, doc)
}

pub fn is_private(name: &str) -> bool {
    name.starts_with(PRIVATE_MARKER)
}

/// `_name` → `name`; public names pass through.
pub fn public_name(name: &str) -> &str {
    name.strip_prefix(PRIVATE_MARKER).unwrap_or(name)
}

/// `name` → `_name`; private names pass through.
pub fn private_name(name: &str) -> String {
    if is_private(name) {
        name.to_string()
    } else {
        format!("{PRIVATE_MARKER}{name}")
    }
}
