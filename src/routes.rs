//! Go-to-definition for GetX route names.
//!
//! A route name literal inside a `List<GetPage>` member jumps to the methods
//! that use the same literal; anywhere else it jumps to the matching
//! `GetPage(name: ...)` entries and names the page each one builds.

use tracing::debug;

use crate::document::{Position, Range, TextDocument};
use crate::heuristics;
use crate::outline::{ElementKind, Outline};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub position: Position,
    /// `HomePage` for `page: () => HomePage()`.
    pub page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    /// The route name under the cursor, quotes excluded.
    pub origin: Range,
    pub name: String,
    pub targets: Vec<RouteTarget>,
}

pub fn route_definition(doc: &TextDocument, outline: &Outline, position: Position) -> Option<RouteDefinition> {
    let literal = heuristics::string_literal_at(doc.line(position.line), position.character)?;
    let inner = literal.inner_span();
    let origin = Range::new(
        Position::new(position.line, inner.start),
        Position::new(position.line, inner.end),
    );

    let class = outline.first_class()?;
    let page_lists: Vec<&Outline> = class
        .children
        .iter()
        .filter(|c| matches!(c.kind(), ElementKind::Method | ElementKind::Field))
        .filter(|c| c.element.return_type.as_deref().is_some_and(heuristics::is_get_page_list_type))
        .collect();
    if page_lists.is_empty() {
        debug!(class = class.name(), "no GetPage list in class");
        return None;
    }

    let in_page_list = page_lists.iter().any(|p| p.code_range.contains(position));
    let targets = if in_page_list {
        usages(doc, class, &literal.inner, position)
    } else {
        declarations(doc, &page_lists, &literal.inner)
    };
    if targets.is_empty() {
        return None;
    }
    Some(RouteDefinition { origin, name: literal.inner, targets })
}

/// Methods, other than the one at `position`, containing the literal.
fn usages(doc: &TextDocument, class: &Outline, name: &str, position: Position) -> Vec<RouteTarget> {
    class
        .children_of_kind(ElementKind::Method)
        .filter(|m| !m.code_range.contains(position))
        .flat_map(|m| {
            let text = doc.text_in(m.code_range);
            heuristics::string_literals(text)
                .into_iter()
                .filter(|l| l.inner == name)
                .map(|_| RouteTarget { position: m.code_range.start, page: None })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn declarations(doc: &TextDocument, page_lists: &[&Outline], name: &str) -> Vec<RouteTarget> {
    let mut out = Vec::new();
    for list in page_lists {
        let base = doc.offset_at(list.code_range.start);
        let text = doc.text_in(list.code_range);
        for (offset, entry) in heuristics::get_page_entries(text, name) {
            out.push(RouteTarget {
                position: doc.position_at(base + offset),
                page: heuristics::page_builder_target(&entry),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::fixtures::{node, range, unit};

    const ROUTES: &str = "class AppPages {
  static final List<GetPage> pages = [
    GetPage(name: '/home', page: () => HomePage()),
    GetPage(name: '/about', page: () => AboutPage()),
  ];

  static void goHome() {
    Get.toNamed('/home');
  }

  static void goAbout() => Get.toNamed('/about');
}
";

    fn outline() -> Outline {
        let mut class = node(ElementKind::Class, "AppPages", None, range(0, 6, 0, 14), range(0, 0, 11, 1));
        class.children = vec![
            node(ElementKind::Field, "pages", Some("List<GetPage<dynamic>>"), range(1, 29, 1, 34), range(1, 29, 4, 3)),
            node(ElementKind::Method, "goHome", Some("void"), range(6, 14, 6, 20), range(6, 2, 8, 3)),
            node(ElementKind::Method, "goAbout", Some("void"), range(10, 14, 10, 21), range(10, 2, 10, 49)),
        ];
        unit(vec![class])
    }

    #[test]
    fn usage_jumps_to_getpage_entry() {
        let doc = TextDocument::new("lib/routes.dart", ROUTES);
        let def = route_definition(&doc, &outline(), Position::new(7, 17)).unwrap();
        assert_eq!(def.name, "/home");
        assert_eq!(def.origin, range(7, 17, 7, 22));
        assert_eq!(
            def.targets,
            [RouteTarget { position: Position::new(2, 4), page: Some("HomePage".into()) }]
        );
    }

    #[test]
    fn entry_jumps_to_usages() {
        let doc = TextDocument::new("lib/routes.dart", ROUTES);
        let def = route_definition(&doc, &outline(), Position::new(3, 20)).unwrap();
        assert_eq!(def.name, "/about");
        assert_eq!(def.targets, [RouteTarget { position: Position::new(10, 2), page: None }]);
    }

    #[test]
    fn nothing_outside_literals_or_without_page_lists() {
        let doc = TextDocument::new("lib/routes.dart", ROUTES);
        assert!(route_definition(&doc, &outline(), Position::new(6, 4)).is_none());

        let mut bare = outline();
        bare.children[0].children.remove(0);
        assert!(route_definition(&doc, &bare, Position::new(7, 17)).is_none());
    }
}
