//! Localization keys: derived from an English rendering of the text, or
//! supplied by the user and validated.

use once_cell::sync::Lazy;
use regex::Regex;

use super::arb::ArbFile;
use super::placeholder;
use crate::error::{Error, Result};

static KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("key regex"));

static NOT_KEY_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{P}\p{S}\s]").expect("key separator regex"));

static UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").expect("underscore run regex"));

const FORMAT_SUFFIX: &str = "_format";

/// `"Hello, World!"` → `hello_world`; `_format` is appended for texts that
/// had placeholders. `None` when nothing usable is left.
pub fn derive_key(english: &str, has_placeholders: bool) -> Option<String> {
    let text = placeholder::fix_newlines(english).replace("\\n", "_");
    let lowered = text.to_lowercase();
    let separated = NOT_KEY_CHAR.replace_all(&lowered, "_");
    let collapsed = UNDERSCORES.replace_all(&separated, "_");
    let base = collapsed.trim_matches('_');
    if base.is_empty() {
        return None;
    }
    Some(if has_placeholders { format!("{base}{FORMAT_SUFFIX}") } else { base.to_string() })
}

pub fn is_valid_key(key: &str) -> bool {
    KEY.is_match(key)
}

/// A key is usable when it is an identifier and the template lacks it.
pub fn validate_key(key: &str, template: &ArbFile) -> Result<()> {
    if !is_valid_key(key) {
        return Err(Error::InvalidKey(key.to_string()));
    }
    if template.contains_key(key) {
        return Err(Error::DuplicateKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn derivation_rules() {
        assert_eq!(derive_key("Hello, World!", false).as_deref(), Some("hello_world"));
        assert_eq!(derive_key("  Save  & exit ", false).as_deref(), Some("save_exit"));
        assert_eq!(derive_key("Line one\\nline two", false).as_deref(), Some("line_one_line_two"));
        assert_eq!(derive_key("Broken \\ n newline", false).as_deref(), Some("broken_newline"));
        assert_eq!(derive_key("Total items", true).as_deref(), Some("total_items_format"));
        assert_eq!(derive_key("日本語", false).as_deref(), Some("日本語"));
        assert_eq!(derive_key("!!!", false), None);
        assert_eq!(derive_key("", false), None);
        assert_eq!(derive_key(" ", true), None);
    }

    #[test]
    fn validation() {
        let template = ArbFile {
            path: PathBuf::from("app_en.arb"),
            entries: json!({"@@locale": "en", "hello": "Hello"}).as_object().cloned().unwrap(),
        };
        assert!(validate_key("goodbye", &template).is_ok());
        assert!(matches!(validate_key("hello", &template), Err(Error::DuplicateKey(_))));
        assert!(matches!(validate_key("1st", &template), Err(Error::InvalidKey(_))));
        assert!(matches!(validate_key("a-b", &template), Err(Error::InvalidKey(_))));
        assert!(is_valid_key("_private2"));
    }
}
