//! The Flutter project view: a filtered file tree with basic file
//! operations.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

const HIDDEN_SUFFIXES: [&str; 3] = [".lock", ".log", ".iml"];
const PLATFORM_DIRS: [&str; 8] = ["android", "ios", "web", "macos", "windows", "linux", "unix", "ohos"];
const IMAGE_SUFFIXES: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    Dart,
    Arb,
    Yaml,
    Markdown,
    Text,
    Html,
    Css,
    Js,
    Ts,
    Python,
    Image,
    Other,
}

impl NodeKind {
    fn for_file(name: &str) -> Self {
        let name = name.to_lowercase();
        let ends = |s: &str| name.ends_with(s);
        if ends(".dart") {
            NodeKind::Dart
        } else if ends(".arb") {
            NodeKind::Arb
        } else if ends(".yaml") {
            NodeKind::Yaml
        } else if ends(".md") {
            NodeKind::Markdown
        } else if ends(".txt") {
            NodeKind::Text
        } else if ends(".html") {
            NodeKind::Html
        } else if ends(".css") {
            NodeKind::Css
        } else if ends(".js") {
            NodeKind::Js
        } else if ends(".ts") {
            NodeKind::Ts
        } else if ends(".py") {
            NodeKind::Python
        } else if IMAGE_SUFFIXES.iter().any(|s| ends(s)) {
            NodeKind::Image
        } else {
            NodeKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub path: PathBuf,
    pub name: String,
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

#[derive(Debug, Clone)]
pub struct ProjectTree {
    root: PathBuf,
}

impl ProjectTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `name` inside `parent` shows up in the tree.
    pub fn is_visible(&self, parent: &Path, name: &str, is_dir: bool) -> bool {
        if name.is_empty()
            || name.starts_with('.')
            || name.starts_with('_')
            || HIDDEN_SUFFIXES.iter().any(|s| name.ends_with(s))
        {
            return false;
        }
        if is_dir {
            if name == "build" {
                return false;
            }
            if PLATFORM_DIRS.contains(&name) && (parent == self.root || parent.ends_with("example")) {
                return false;
            }
        }
        true
    }

    /// Visible entries of `dir` (the root when `None`), folders first, each
    /// group sorted by name.
    pub fn children(&self, dir: Option<&Path>) -> Result<Vec<TreeNode>> {
        let dir = dir.unwrap_or(&self.root);
        let mut folders = Vec::new();
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type()?.is_dir();
            if !self.is_visible(dir, &name, is_dir) {
                continue;
            }
            let kind = if is_dir { NodeKind::Folder } else { NodeKind::for_file(&name) };
            let node = TreeNode { path: entry.path(), name, kind };
            if is_dir {
                folders.push(node);
            } else {
                files.push(node);
            }
        }
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));
        folders.extend(files);
        Ok(folders)
    }

    pub fn create_file(&self, parent: Option<&Path>, name: &str) -> Result<PathBuf> {
        let path = self.new_entry_path(parent, name)?;
        fs::write(&path, "")?;
        info!(?path, "file created");
        Ok(path)
    }

    pub fn create_folder(&self, parent: Option<&Path>, name: &str) -> Result<PathBuf> {
        let path = self.new_entry_path(parent, name)?;
        fs::create_dir(&path)?;
        info!(?path, "folder created");
        Ok(path)
    }

    /// Rename within the same parent folder.
    pub fn rename(&self, path: &Path, new_name: &str) -> Result<PathBuf> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let parent = path.parent().unwrap_or(&self.root);
        let target = self.new_entry_path(Some(parent), new_name)?;
        fs::rename(path, &target)?;
        info!(from = ?path, to = ?target, "renamed");
        Ok(target)
    }

    /// Delete a file, or a folder with everything in it.
    pub fn delete(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else if path.exists() {
            fs::remove_file(path)?;
        } else {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        info!(?path, "deleted");
        Ok(())
    }

    fn new_entry_path(&self, parent: Option<&Path>, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let path = parent.unwrap_or(&self.root).join(name);
        if path.exists() {
            return Err(Error::AlreadyExists(path));
        }
        Ok(path)
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(Error::InvalidFileName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, ProjectTree) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for d in ["lib", "android", "build", ".dart_tool", "example/ios", "example/lib", "lib/web"] {
            fs::create_dir_all(root.join(d)).unwrap();
        }
        for f in ["pubspec.yaml", "pubspec.lock", "app.iml", "README.md", "_private.dart", "lib/main.dart", "lib/logo.PNG"] {
            fs::write(root.join(f), "").unwrap();
        }
        let tree = ProjectTree::new(root);
        (dir, tree)
    }

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn root_listing_filters_and_orders() {
        let (_dir, tree) = project();
        let nodes = tree.children(None).unwrap();
        assert_eq!(names(&nodes), ["example", "lib", "README.md", "pubspec.yaml"]);
        assert!(nodes[0].is_dir());
        assert_eq!(nodes[3].kind, NodeKind::Yaml);
    }

    #[test]
    fn platform_dirs_only_hidden_at_root_or_example() {
        let (dir, tree) = project();
        let example = tree.children(Some(&dir.path().join("example"))).unwrap();
        assert_eq!(names(&example), ["lib"]);
        let lib = tree.children(Some(&dir.path().join("lib"))).unwrap();
        assert_eq!(names(&lib), ["web", "logo.PNG", "main.dart"]);
        assert_eq!(lib[1].kind, NodeKind::Image);
        assert_eq!(lib[2].kind, NodeKind::Dart);
    }

    #[test]
    fn file_operations() {
        let (dir, tree) = project();
        let lib = dir.path().join("lib");
        let created = tree.create_file(Some(&lib), "home.dart").unwrap();
        assert!(created.is_file());
        assert!(matches!(tree.create_file(Some(&lib), "home.dart"), Err(Error::AlreadyExists(_))));
        assert!(matches!(tree.create_folder(None, "a/b"), Err(Error::InvalidFileName(_))));
        assert!(matches!(tree.create_folder(None, ""), Err(Error::InvalidFileName(_))));

        let folder = tree.create_folder(None, "assets").unwrap();
        let renamed = tree.rename(&created, "index.dart").unwrap();
        assert_eq!(renamed, lib.join("index.dart"));
        assert!(matches!(tree.rename(&renamed, "main.dart"), Err(Error::AlreadyExists(_))));

        tree.delete(&renamed).unwrap();
        tree.delete(&folder).unwrap();
        assert!(!renamed.exists() && !folder.exists());
        assert!(matches!(tree.delete(&folder), Err(Error::NotFound(_))));
    }
}
