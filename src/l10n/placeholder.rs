//! Dart interpolations inside extracted literals, and repairs for what
//! machine translation does to `{paramN}` placeholders and `\n` escapes.

use once_cell::sync::Lazy;
use regex::Regex;

static INTERPOLATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[A-Za-z_][A-Za-z_0-9]*|\$\{[^}]*\}").expect("interpolation regex"));

static SPLIT_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\s+n").expect("split newline regex"));

/// A literal with its interpolations pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// ARB message text: interpolations replaced by `{param0}`, `{param1}`...
    pub message: String,
    /// Text with the interpolations removed, used to derive a key.
    pub key_source: String,
    /// Interpolations in source order, as written (`$name`, `${a.b}`).
    pub placeholders: Vec<String>,
}

impl Extracted {
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }
}

pub fn extract(literal: &str) -> Extracted {
    let mut message = String::with_capacity(literal.len());
    let mut key_source = String::with_capacity(literal.len());
    let mut placeholders = Vec::new();
    let mut last = 0;
    for (i, m) in INTERPOLATION.find_iter(literal).enumerate() {
        let before = &literal[last..m.start()];
        message.push_str(before);
        message.push_str(&format!("{{param{i}}}"));
        key_source.push_str(before);
        placeholders.push(m.as_str().to_string());
        last = m.end();
    }
    message.push_str(&literal[last..]);
    key_source.push_str(&literal[last..]);
    Extracted { message, key_source, placeholders }
}

/// `$name` → `name`, `${ user.name }` → `user.name`.
pub fn argument(placeholder: &str) -> String {
    match placeholder.strip_prefix("${").and_then(|p| p.strip_suffix('}')) {
        Some(expr) => expr.trim().to_string(),
        None => placeholder.trim_start_matches('$').to_string(),
    }
}

/// Dart expression replacing the literal: `S.current.key` or
/// `S.current.key(a, b)`.
pub fn reference(key: &str, placeholders: &[String]) -> String {
    if placeholders.is_empty() {
        return format!("S.current.{key}");
    }
    let args: Vec<String> = placeholders.iter().map(|p| argument(p)).collect();
    format!("S.current.{key}({})", args.join(", "))
}

/// `\ n` (split by a translator) back to `\n`.
pub fn fix_newlines(text: &str) -> String {
    SPLIT_NEWLINE.replace_all(text, r"\n").into_owned()
}

/// Lower-case `{ParamN}` placeholders for `N < count`, then fix newlines.
/// With escaping on, a placeholder written as `'{ParamN}'` is literal text
/// and stays. `None` for an empty translation.
pub fn repair_translation(text: &str, use_escaping: bool, count: usize) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let mut out = text.to_string();
    let mut start = 0;
    for i in 0..count {
        let wrong = format!("{{Param{i}}}");
        let Some(found) = out[start..].find(&wrong).map(|at| at + start) else {
            continue;
        };
        if use_escaping && out[..found].ends_with('\'') {
            continue;
        }
        out.replace_range(found..found + wrong.len(), &format!("{{param{i}}}"));
        start = found + wrong.len();
    }
    Some(fix_newlines(&out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolations_become_params() {
        let e = extract("Hi $name, you have ${cart.items.length} items");
        assert_eq!(e.message, "Hi {param0}, you have {param1} items");
        assert_eq!(e.key_source, "Hi , you have  items");
        assert_eq!(e.placeholders, ["$name", "${cart.items.length}"]);
        assert!(e.has_placeholders());
        assert_eq!(reference("hi_format", &e.placeholders), "S.current.hi_format(name, cart.items.length)");
    }

    #[test]
    fn braces_stop_at_first_close() {
        let e = extract("${a} and ${b}");
        assert_eq!(e.placeholders, ["${a}", "${b}"]);
        assert_eq!(e.message, "{param0} and {param1}");
    }

    #[test]
    fn plain_literal() {
        let e = extract("Save");
        assert!(!e.has_placeholders());
        assert_eq!(reference("save", &e.placeholders), "S.current.save");
        assert_eq!(argument("${ x }"), "x");
    }

    #[test]
    fn repairs() {
        assert_eq!(
            repair_translation("{Param0} 个 {Param1}", false, 2).as_deref(),
            Some("{param0} 个 {param1}")
        );
        assert_eq!(repair_translation("'{Param0}' {Param1}", true, 2).as_deref(), Some("'{Param0}' {param1}"));
        assert_eq!(repair_translation("'{Param0}'", false, 1).as_deref(), Some("'{param0}'"));
        assert_eq!(repair_translation("{Param0}", false, 0).as_deref(), Some("{Param0}"));
        assert_eq!(repair_translation("a\\ nb", false, 0).as_deref(), Some("a\\nb"));
        assert_eq!(repair_translation("", false, 3), None);
    }
}
