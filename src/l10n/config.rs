//! `l10n.yaml` as read by `flutter gen-l10n`, reduced to the keys used here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "l10n.yaml";

const DEFAULT_ARB_DIR: &str = "lib/l10n";
const DEFAULT_TEMPLATE: &str = "app_en.arb";
const DEFAULT_OUTPUT_DIR: &str = "lib/l10n";
const DEFAULT_OUTPUT_FILE: &str = "app_localizations.dart";

/// `use-escaping` shows up both as a YAML bool and as a quoted string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn enabled(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => s == "true",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawConfig {
    project_dir: Option<String>,
    arb_dir: Option<String>,
    template_arb_file: Option<String>,
    use_escaping: Option<Flag>,
    output_dir: Option<String>,
    output_localization_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L10nConfig {
    /// Workspace root, or `project-dir` resolved against it.
    pub project_dir: PathBuf,
    pub arb_dir: String,
    pub template_arb_file: String,
    pub use_escaping: bool,
    pub output_dir: String,
    pub output_localization_file: String,
}

impl L10nConfig {
    pub fn defaults(root: &Path) -> Self {
        Self {
            project_dir: root.to_path_buf(),
            arb_dir: DEFAULT_ARB_DIR.to_string(),
            template_arb_file: DEFAULT_TEMPLATE.to_string(),
            use_escaping: false,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            output_localization_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }

    /// Read `<root>/l10n.yaml`; absent or empty values keep their defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            debug!(?path, "no l10n.yaml, using defaults");
            return Ok(Self::defaults(root));
        }
        Self::parse(root, &fs::read_to_string(&path)?)
    }

    pub fn parse(root: &Path, yaml: &str) -> Result<Self> {
        let mut config = Self::defaults(root);
        if yaml.trim().is_empty() {
            return Ok(config);
        }
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        let given = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        if let Some(dir) = given(raw.project_dir) {
            config.project_dir = root.join(dir);
        }
        if let Some(dir) = given(raw.arb_dir) {
            config.arb_dir = dir;
        }
        if let Some(file) = given(raw.template_arb_file) {
            config.template_arb_file = file;
        }
        if let Some(flag) = raw.use_escaping {
            config.use_escaping = flag.enabled();
        }
        if let Some(dir) = given(raw.output_dir) {
            config.output_dir = dir;
        }
        if let Some(file) = given(raw.output_localization_file) {
            config.output_localization_file = file;
        }
        Ok(config)
    }

    pub fn arb_dir_path(&self) -> PathBuf {
        self.project_dir.join(&self.arb_dir)
    }

    pub fn template_path(&self) -> PathBuf {
        self.arb_dir_path().join(&self.template_arb_file)
    }

    /// The template path, provided it names a regular file.
    pub fn require_template(&self) -> Result<PathBuf> {
        let path = self.template_path();
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::TemplateArbMissing(path))
        }
    }

    pub fn output_file_path(&self) -> PathBuf {
        self.project_dir.join(&self.output_dir).join(&self.output_localization_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = L10nConfig::load(dir.path()).unwrap();
        assert_eq!(config, L10nConfig::defaults(dir.path()));
        assert_eq!(config.template_path(), dir.path().join("lib/l10n/app_en.arb"));
        assert_eq!(config.output_file_path(), dir.path().join("lib/l10n/app_localizations.dart"));
        assert!(!config.use_escaping);
    }

    #[test]
    fn overrides_and_blank_values() {
        let yaml = "arb-dir: res/arb\ntemplate-arb-file: intl_zh.arb\noutput-dir: ''\nuse-escaping: \"true\"\n";
        let config = L10nConfig::parse(Path::new("/w"), yaml).unwrap();
        assert_eq!(config.template_path(), Path::new("/w/res/arb/intl_zh.arb"));
        assert_eq!(config.output_dir, "lib/l10n");
        assert!(config.use_escaping);

        let config = L10nConfig::parse(Path::new("/w"), "use-escaping: true\nproject-dir: app").unwrap();
        assert!(config.use_escaping);
        assert_eq!(config.arb_dir_path(), Path::new("/w/app/lib/l10n"));

        let config = L10nConfig::parse(Path::new("/w"), "use-escaping: yes-please").unwrap();
        assert!(!config.use_escaping);
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = L10nConfig::parse(Path::new("/w"), "arb-dir: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn template_must_be_a_file() {
        let dir = TempDir::new().unwrap();
        let config = L10nConfig::defaults(dir.path());
        assert!(matches!(config.require_template(), Err(Error::TemplateArbMissing(_))));
        fs::create_dir_all(config.template_path()).unwrap();
        assert!(matches!(config.require_template(), Err(Error::TemplateArbMissing(_))));
    }
}
