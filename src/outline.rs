//! Read-only symbol outline of a Dart file.
//!
//! The outline comes from the Dart analysis server; this crate only consumes
//! it through [`OutlineProvider`]. Ranges follow the server: `range` is the
//! declared name, `code_range` the whole declaration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::document::{Position, Range};
use crate::error::{Error, Result};
use crate::path_de;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementKind {
    CompilationUnit,
    Class,
    ClassTypeAlias,
    Mixin,
    Enum,
    EnumConstant,
    Extension,
    Field,
    Method,
    Constructor,
    Getter,
    Setter,
    Function,
    TopLevelVariable,
    #[serde(other)]
    Other,
}

impl ElementKind {
    pub fn is_class_like(self) -> bool {
        matches!(self, ElementKind::Class | ElementKind::Mixin)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub kind: ElementKind,
    pub name: String,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub parameters: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outline {
    pub element: Element,
    /// Range of the declared name.
    pub range: Range,
    /// Range of the full declaration.
    pub code_range: Range,
    #[serde(default)]
    pub children: Vec<Outline>,
}

impl Outline {
    pub fn kind(&self) -> ElementKind {
        self.element.kind
    }

    pub fn name(&self) -> &str {
        &self.element.name
    }

    /// Top-level class or mixin whose code range contains `pos`.
    pub fn class_at(&self, pos: Position) -> Option<&Outline> {
        self.top_level()
            .iter()
            .find(|o| o.kind().is_class_like() && o.code_range.contains(pos))
    }

    /// Depth-first first class or mixin.
    pub fn first_class(&self) -> Option<&Outline> {
        if self.kind().is_class_like() {
            return Some(self);
        }
        self.children.iter().find_map(Outline::first_class)
    }

    pub fn has_class_named(&self, name: &str) -> bool {
        self.top_level()
            .iter()
            .any(|o| o.kind().is_class_like() && o.name() == name)
    }

    pub fn children_of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Outline> {
        self.children.iter().filter(move |c| c.kind() == kind)
    }

    /// Same tree with every range passed through `map`, for reusing an
    /// outline after edits that only shifted text around.
    pub fn rebased(&self, map: &impl Fn(Range) -> Range) -> Outline {
        Outline {
            element: self.element.clone(),
            range: map(self.range),
            code_range: map(self.code_range),
            children: self.children.iter().map(|c| c.rebased(map)).collect(),
        }
    }

    /// Children of the compilation unit, or `self` alone for any other node.
    pub fn top_level(&self) -> &[Outline] {
        if self.kind() == ElementKind::CompilationUnit {
            &self.children
        } else {
            std::slice::from_ref(self)
        }
    }
}

pub trait OutlineProvider {
    fn outline(&self, path: &Path) -> Result<Outline>;
}

/// Outline dumps stored as JSON, either at an explicit path or next to the
/// source as `<file>.outline.json`.
#[derive(Debug, Clone, Default)]
pub struct JsonOutlineProvider {
    explicit: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OutlineDump {
    Unit(Outline),
    TopLevel(Vec<Outline>),
}

impl JsonOutlineProvider {
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    fn dump_path(&self, source: &Path) -> PathBuf {
        match &self.explicit {
            Some(p) => p.clone(),
            None => {
                let mut name = source.as_os_str().to_os_string();
                name.push(".outline.json");
                PathBuf::from(name)
            }
        }
    }
}

impl OutlineProvider for JsonOutlineProvider {
    fn outline(&self, path: &Path) -> Result<Outline> {
        let dump = self.dump_path(path);
        if !dump.exists() {
            return Err(Error::OutlineUnavailable(path.to_path_buf()));
        }
        let text = fs::read_to_string(&dump)?;
        parse_outline(&text).map_err(|reason| Error::OutlineParse { path: dump, reason })
    }
}

pub fn parse_outline(text: &str) -> Result<Outline, String> {
    Ok(match path_de::from_str_with_path::<OutlineDump>(text)? {
        OutlineDump::Unit(o) => o,
        OutlineDump::TopLevel(children) => Outline {
            element: Element {
                kind: ElementKind::CompilationUnit,
                name: String::new(),
                return_type: None,
                parameters: None,
            },
            range: Range::default(),
            code_range: Range::default(),
            children,
        },
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    const DUMP: &str = r#"[
      {
        "element": {"kind": "CLASS", "name": "User"},
        "range": {"start": {"line": 0, "character": 6}, "end": {"line": 0, "character": 10}},
        "codeRange": {"start": {"line": 0, "character": 0}, "end": {"line": 3, "character": 1}},
        "children": [
          {
            "element": {"kind": "FIELD", "name": "name", "returnType": "String?"},
            "range": {"start": {"line": 1, "character": 10}, "end": {"line": 1, "character": 14}},
            "codeRange": {"start": {"line": 1, "character": 2}, "end": {"line": 1, "character": 15}}
          },
          {
            "element": {"kind": "TYPEDEF_THING", "name": "x"},
            "range": {"start": {"line": 2, "character": 0}, "end": {"line": 2, "character": 1}},
            "codeRange": {"start": {"line": 2, "character": 0}, "end": {"line": 2, "character": 1}}
          }
        ]
      }
    ]"#;

    #[test]
    fn parses_top_level_dump() {
        let outline = parse_outline(DUMP).unwrap();
        assert_eq!(outline.kind(), ElementKind::CompilationUnit);
        let class = outline.class_at(Position::new(1, 3)).unwrap();
        assert_eq!(class.name(), "User");
        assert_eq!(class.children[0].element.return_type.as_deref(), Some("String?"));
        assert_eq!(class.children[1].kind(), ElementKind::Other);
        assert!(outline.has_class_named("User"));
        assert!(outline.class_at(Position::new(9, 0)).is_none());
    }

    #[test]
    fn bad_dump_reports_path() {
        let err = parse_outline(r#"{"element": {"kind": "CLASS"}}"#).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn first_class_descends() {
        let class = node(ElementKind::Mixin, "M", None, range(0, 0, 0, 1), range(0, 0, 2, 0));
        let u = unit(vec![
            node(ElementKind::Function, "main", None, range(0, 0, 0, 1), range(0, 0, 0, 1)),
            class,
        ]);
        assert_eq!(u.first_class().unwrap().name(), "M");
    }

    #[test]
    fn missing_dump_is_unavailable() {
        let provider = JsonOutlineProvider::new(None);
        let err = provider.outline(Path::new("/definitely/not/here.dart")).unwrap_err();
        assert!(matches!(err, Error::OutlineUnavailable(_)));
    }
}
