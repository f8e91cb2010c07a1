//! Image previews for `Images.xxx` references.
//!
//! The images class is a Dart file of `static String get xxx => 'path';`
//! getters. Hovering a reference elsewhere, or a path inside that file,
//! resolves to the asset, preferring a high-density variant.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::heuristics;
use crate::settings::Settings;

/// Density folders tried next to an asset, in order of preference.
pub const DENSITY_VARIANTS: [&str; 4] = ["3.0x", "4.0x", "2.0x", "1.5x"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    /// Path as written in the images file.
    pub declared: String,
    /// File to open: the declared asset, or the variant if that is missing.
    pub open_path: PathBuf,
    /// File to render.
    pub image_path: PathBuf,
}

impl ImagePreview {
    pub fn markdown(&self) -> String {
        format!(
            "[{}]({})\n\n![]({})\n",
            self.declared,
            self.open_path.display(),
            self.image_path.display()
        )
    }
}

#[derive(Debug, Clone)]
pub struct AssetResolver {
    root: PathBuf,
    images_file: PathBuf,
    class_name: String,
}

impl AssetResolver {
    /// `None` unless both the images file and its class name are configured.
    pub fn from_settings(root: &Path, settings: &Settings) -> Option<Self> {
        let file = settings.images_file_path.as_deref().filter(|p| !p.trim().is_empty())?;
        let class_name = settings.images_class_name.trim();
        if class_name.is_empty() {
            return None;
        }
        Some(Self {
            root: root.to_path_buf(),
            images_file: root.join(file),
            class_name: class_name.to_string(),
        })
    }

    pub fn images_file(&self) -> &Path {
        &self.images_file
    }

    /// Previews for whatever sits under `column` on `line` of `doc_path`.
    pub fn hover(&self, doc_path: &Path, line: &str, column: usize) -> Result<Vec<ImagePreview>> {
        let declared = if same_path(doc_path, &self.images_file) {
            heuristics::quoted_value_at(line, column).into_iter().collect()
        } else {
            self.referenced_paths(line, column)?
        };
        Ok(declared.into_iter().map(|d| self.preview(d)).collect())
    }

    fn referenced_paths(&self, line: &str, column: usize) -> Result<Vec<String>> {
        if !self.images_file.is_file() {
            debug!(file = ?self.images_file, "images file missing");
            return Ok(Vec::new());
        }
        let Some((name, _)) = heuristics::image_reference_at(line, column, &self.class_name) else {
            return Ok(Vec::new());
        };
        let text = fs::read_to_string(&self.images_file)?;
        Ok(heuristics::static_string_getter_values(&text, &name))
    }

    fn preview(&self, declared: String) -> ImagePreview {
        let rel = self.high_density(&declared).unwrap_or_else(|| declared.clone());
        let image_path = self.root.join(&rel);
        let direct = self.root.join(&declared);
        let open_path = if direct.exists() { direct } else { image_path.clone() };
        ImagePreview { declared, open_path, image_path }
    }

    /// `a/b.png` → `a/3.0x/b.png` (or the next variant that exists).
    fn high_density(&self, declared: &str) -> Option<String> {
        let (folder, name) = declared.rsplit_once('/')?;
        DENSITY_VARIANTS.iter().find_map(|variant| {
            let rel = format!("{folder}/{variant}/{name}");
            self.root.join(&rel).exists().then_some(rel)
        })
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const IMAGES: &str = "class Images {\n  static String get logo => 'assets/images/logo.png';\n  static String get icon =>\n      \"assets/icons/icon.png\";\n}\n";

    fn workspace() -> (TempDir, AssetResolver) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("lib/res")).unwrap();
        fs::write(root.join("lib/res/images.dart"), IMAGES).unwrap();
        fs::create_dir_all(root.join("assets/images/2.0x")).unwrap();
        fs::create_dir_all(root.join("assets/images/4.0x")).unwrap();
        fs::write(root.join("assets/images/logo.png"), b"png").unwrap();
        fs::write(root.join("assets/images/2.0x/logo.png"), b"png").unwrap();
        fs::write(root.join("assets/images/4.0x/logo.png"), b"png").unwrap();
        let settings = Settings { images_file_path: Some("lib/res/images.dart".into()), ..Settings::default() };
        let resolver = AssetResolver::from_settings(root, &settings).unwrap();
        (dir, resolver)
    }

    #[test]
    fn reference_resolves_to_preferred_variant() {
        let (dir, resolver) = workspace();
        let root = dir.path();
        let previews = resolver.hover(&root.join("lib/home.dart"), "Image.asset(Images.logo)", 15).unwrap();
        assert_eq!(previews.len(), 1);
        let p = &previews[0];
        assert_eq!(p.declared, "assets/images/logo.png");
        assert_eq!(p.image_path, root.join("assets/images/4.0x/logo.png"));
        assert_eq!(p.open_path, root.join("assets/images/logo.png"));
        assert_eq!(
            p.markdown(),
            format!(
                "[assets/images/logo.png]({})\n\n![]({})\n",
                root.join("assets/images/logo.png").display(),
                root.join("assets/images/4.0x/logo.png").display()
            )
        );
    }

    #[test]
    fn multiline_getter_and_missing_asset() {
        let (dir, resolver) = workspace();
        let root = dir.path();
        let previews = resolver.hover(&root.join("lib/home.dart"), "Images.icon", 8).unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].image_path, root.join("assets/icons/icon.png"));
        assert_eq!(previews[0].open_path, previews[0].image_path);
    }

    #[test]
    fn hover_inside_images_file() {
        let (dir, resolver) = workspace();
        let file = dir.path().join("lib/res/images.dart");
        let previews = resolver.hover(&file, "  static String get logo => 'assets/images/logo.png';", 40).unwrap();
        assert_eq!(previews[0].declared, "assets/images/logo.png");
        assert!(resolver.hover(&file, "class Images {", 3).unwrap().is_empty());
    }

    #[test]
    fn unconfigured_or_unknown() {
        assert!(AssetResolver::from_settings(Path::new("/w"), &Settings::default()).is_none());
        let settings = Settings {
            images_file_path: Some("lib/images.dart".into()),
            images_class_name: " ".into(),
            ..Settings::default()
        };
        assert!(AssetResolver::from_settings(Path::new("/w"), &settings).is_none());

        let (dir, resolver) = workspace();
        let home = dir.path().join("lib/home.dart");
        assert!(resolver.hover(&home, "Images.missing", 9).unwrap().is_empty());
        assert!(resolver.hover(&home, "Icons.add", 3).unwrap().is_empty());
    }
}
