//! User settings, read from `.dart-devtools.json` at the workspace root.
//!
//! Every key is optional; a missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::FormatOptions;
use crate::error::{Error, Result};
use crate::path_de;
use crate::synth::SynthOptions;

pub const SETTINGS_FILE: &str = ".dart-devtools.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Appended to every class created from JSON.
    pub class_suffix: String,
    /// JSON values become `///` comments.
    pub gen_doc: bool,
    pub gen_constructor: bool,
    pub gen_serialization: bool,
    /// Expression for `@JsonSerializable(converters: ...)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converters: Option<String>,
    /// Ask for the key even when one could be derived.
    pub show_rename_dialog: bool,
    /// Dart file holding `static String get xxx => 'path'` image getters,
    /// relative to the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_file_path: Option<String>,
    pub images_class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_src_path: Option<String>,
    pub tab_size: usize,
    pub insert_spaces: bool,
    /// JSON glossary backing machine translation, relative to the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossary_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            class_suffix: String::new(),
            gen_doc: true,
            gen_constructor: true,
            gen_serialization: true,
            converters: None,
            show_rename_dialog: false,
            images_file_path: None,
            images_class_name: "Images".to_string(),
            image_src_path: None,
            tab_size: 2,
            insert_spaces: true,
            glossary_file: None,
        }
    }
}

impl Settings {
    pub fn path(root: &Path) -> PathBuf {
        root.join(SETTINGS_FILE)
    }

    /// Load from `root`, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            debug!(?path, "no settings file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        path_de::from_str_with_path(&text).map_err(|reason| Error::Settings { path, reason })
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|e| Error::Settings {
            path: Self::path(root),
            reason: e.to_string(),
        })?;
        fs::write(Self::path(root), text)?;
        Ok(())
    }

    pub fn synth_options(&self) -> SynthOptions {
        SynthOptions {
            emit_doc_comments: self.gen_doc,
            emit_class: true,
            emit_constructor: self.gen_constructor,
            emit_serialization: self.gen_serialization,
            class_suffix: self.class_suffix.clone(),
            converters: self.converters.clone().filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            insert_spaces: self.insert_spaces,
            tab_size: self.tab_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_defaults() {
        let dir = TempDir::new().unwrap();
        let s = Settings::load(dir.path()).unwrap();
        assert_eq!(s, Settings::default());
        assert!(s.gen_doc && s.gen_constructor && s.gen_serialization);
        assert_eq!(s.images_class_name, "Images");
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"classSuffix": "Entity", "genDoc": false, "converters": "[DateConverter()]"}"#,
        )
        .unwrap();
        let s = Settings::load(dir.path()).unwrap();
        assert_eq!(s.class_suffix, "Entity");
        assert!(!s.gen_doc);
        assert!(s.gen_serialization);
        let opts = s.synth_options();
        assert_eq!(opts.class_suffix, "Entity");
        assert_eq!(opts.converters.as_deref(), Some("[DateConverter()]"));
    }

    #[test]
    fn bad_type_names_the_key() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), r#"{"tabSize": "wide"}"#).unwrap();
        let err = Settings::load(dir.path()).unwrap_err();
        match err {
            Error::Settings { reason, .. } => assert!(reason.contains("tabSize"), "{reason}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let s = Settings { class_suffix: "Dto".into(), tab_size: 4, ..Settings::default() };
        s.save(dir.path()).unwrap();
        assert_eq!(Settings::load(dir.path()).unwrap(), s);
    }
}
