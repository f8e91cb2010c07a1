//! Per-workspace context shared by every command.

use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::assets::AssetResolver;
use crate::error::Result;
use crate::l10n::{GlossaryTranslator, L10nConfig, Translator};
use crate::project_tree::ProjectTree;
use crate::settings::Settings;

type TranslatorFactory = Box<dyn Fn(&Path, &Settings) -> Result<Box<dyn Translator>>>;

/// Workspace root, its settings, and lazily built services. The translator
/// is created on first use and then reused.
pub struct Workspace {
    root: PathBuf,
    settings: Settings,
    l10n: OnceCell<L10nConfig>,
    translator: OnceCell<Box<dyn Translator>>,
    translator_factory: TranslatorFactory,
}

impl Workspace {
    /// Open `root`, reading `.dart-devtools.json` if present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let settings = Settings::load(&root)?;
        Ok(Self::with_settings(root, settings))
    }

    pub fn with_settings(root: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            root: root.into(),
            settings,
            l10n: OnceCell::new(),
            translator: OnceCell::new(),
            translator_factory: Box::new(glossary_translator),
        }
    }

    /// Replace how the translator is built. Has no effect once it exists.
    pub fn with_translator_factory(
        mut self,
        factory: impl Fn(&Path, &Settings) -> Result<Box<dyn Translator>> + 'static,
    ) -> Self {
        self.translator_factory = Box::new(factory);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `path` relative to the root, unless already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn l10n_config(&self) -> Result<&L10nConfig> {
        self.l10n.get_or_try_init(|| L10nConfig::load(&self.root))
    }

    pub fn translator(&self) -> Result<&dyn Translator> {
        let translator = self
            .translator
            .get_or_try_init(|| (self.translator_factory)(&self.root, &self.settings))?;
        Ok(translator.as_ref())
    }

    pub fn project_tree(&self) -> ProjectTree {
        ProjectTree::new(&self.root)
    }

    pub fn assets(&self) -> Option<AssetResolver> {
        AssetResolver::from_settings(&self.root, &self.settings)
    }
}

/// Default factory: the configured glossary, or an empty one.
fn glossary_translator(root: &Path, settings: &Settings) -> Result<Box<dyn Translator>> {
    let translator = match settings.glossary_file.as_deref().filter(|f| !f.trim().is_empty()) {
        Some(file) => GlossaryTranslator::load(&root.join(file))?,
        None => {
            debug!("no glossary configured, translations will fail");
            GlossaryTranslator::default()
        }
    };
    Ok(Box::new(translator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct Upper;

    impl Translator for Upper {
        fn translate(&self, _source: &str, _target: &str, text: &str) -> Option<String> {
            Some(text.to_uppercase())
        }
    }

    #[test]
    fn translator_is_built_once() {
        let dir = TempDir::new().unwrap();
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let ws = Workspace::open(dir.path()).unwrap().with_translator_factory(move |_, _| {
            counter.set(counter.get() + 1);
            Ok(Box::new(Upper))
        });
        assert_eq!(ws.translator().unwrap().translate("en", "de", "hi").as_deref(), Some("HI"));
        ws.translator().unwrap();
        assert_eq!(built.get(), 1);
    }

    #[test]
    fn glossary_from_settings() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("glossary.json"), r#"{"de": {"Hello": "Hallo"}}"#).unwrap();
        let settings = Settings { glossary_file: Some("glossary.json".into()), ..Settings::default() };
        let ws = Workspace::with_settings(dir.path(), settings);
        assert_eq!(ws.translator().unwrap().translate("en", "de", "Hello").as_deref(), Some("Hallo"));
        assert_eq!(ws.l10n_config().unwrap().arb_dir, "lib/l10n");
        assert_eq!(ws.resolve(Path::new("lib/a.dart")), dir.path().join("lib/a.dart"));
    }
}
