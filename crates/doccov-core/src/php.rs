//! PHP declaration extraction
//!
//! Walks the tree-sitter PHP syntax tree and collects the declarations that
//! documentation can refer to: classes, interfaces, traits, methods,
//! functions and properties.

use crate::element::{CodeElement, ElementKind, Modifier};
use arborium::tree_sitter::{Node, Parser};
use eyre::{Result, eyre};

/// File extension of PHP sources
pub const PHP_EXTENSION: &str = "php";

/// Whether a path names a PHP source file
pub fn is_php_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == PHP_EXTENSION)
}

/// Extract code elements from PHP source code, in document order
///
/// `file` is recorded verbatim on every element.
pub fn extract_elements(file: &str, source: &str) -> Result<Vec<CodeElement>> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_php::language().into())
        .map_err(|e| eyre!("Failed to load PHP grammar: {e}"))?;

    let Some(tree) = parser.parse(source, None) else {
        return Err(eyre!("Failed to parse {file}"));
    };

    let mut walker = Walker {
        file,
        source,
        namespace: None,
        elements: Vec::new(),
    };
    walker.visit_children(tree.root_node(), None);
    Ok(walker.elements)
}

struct Walker<'a> {
    file: &'a str,
    source: &'a str,
    namespace: Option<String>,
    elements: Vec<CodeElement>,
}

impl Walker<'_> {
    fn visit_children(&mut self, node: Node, owner: Option<&str>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, owner);
        }
    }

    fn visit(&mut self, node: Node, owner: Option<&str>) {
        match node.kind() {
            "namespace_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string());
                match node.child_by_field_name("body") {
                    // namespace X { ... }
                    Some(body) => {
                        let outer = std::mem::replace(&mut self.namespace, name);
                        self.visit_children(body, None);
                        self.namespace = outer;
                    }
                    // namespace X; applies to the rest of the file
                    None => self.namespace = name,
                }
            }
            "class_declaration" => self.visit_type(node, ElementKind::Class),
            "interface_declaration" => self.visit_type(node, ElementKind::Interface),
            "trait_declaration" => self.visit_type(node, ElementKind::Trait),
            // No element kind for enums, and anonymous classes have no name
            // to own their members; neither contributes elements.
            "enum_declaration" | "anonymous_class" => {}
            // Members only count inside a named type
            "method_declaration" | "property_declaration" if owner.is_none() => {}
            "method_declaration" => {
                if let Some(name) = self.name_of(node) {
                    let modifiers = with_implicit_visibility(self.modifiers_of(node));
                    self.push(name, ElementKind::Method, node, owner, modifiers);
                }
            }
            "function_definition" => {
                if let Some(name) = self.name_of(node) {
                    self.push(name, ElementKind::Function, node, None, Vec::new());
                }
            }
            "property_declaration" => {
                let modifiers = with_implicit_visibility(self.modifiers_of(node));
                let mut cursor = node.walk();
                for element in node.children(&mut cursor) {
                    if element.kind() != "property_element" {
                        continue;
                    }
                    if let Some(name) = self.property_name(element) {
                        self.push(
                            name,
                            ElementKind::Property,
                            node,
                            owner,
                            modifiers.clone(),
                        );
                    }
                }
            }
            _ => self.visit_children(node, owner),
        }
    }

    fn visit_type(&mut self, node: Node, kind: ElementKind) {
        let Some(name) = self.name_of(node) else {
            return;
        };
        let modifiers = if kind == ElementKind::Class {
            self.modifiers_of(node)
                .into_iter()
                .filter(|m| matches!(m, Modifier::Abstract | Modifier::Final))
                .collect()
        } else {
            Vec::new()
        };
        self.push(name.clone(), kind, node, None, modifiers);

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, Some(&name));
        }
    }

    fn push(
        &mut self,
        name: String,
        kind: ElementKind,
        node: Node,
        owner: Option<&str>,
        modifiers: Vec<Modifier>,
    ) {
        let mut element = CodeElement::new(name, kind, self.file, node.start_position().row + 1)
            .with_modifiers(modifiers);
        if let Some(ns) = &self.namespace {
            element = element.in_namespace(ns.clone());
        }
        if let Some(owner) = owner {
            element = element.in_type(owner);
        }
        self.elements.push(element);
    }

    fn text(&self, node: Node) -> &str {
        &self.source[node.byte_range()]
    }

    fn name_of(&self, node: Node) -> Option<String> {
        let name = node.child_by_field_name("name")?;
        Some(self.text(name).to_string())
    }

    fn property_name(&self, element: Node) -> Option<String> {
        let mut cursor = element.walk();
        let variable = element
            .children(&mut cursor)
            .find(|c| c.kind() == "variable_name")?;
        let name = self.text(variable).trim_start_matches('$');
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Modifier keywords attached directly to a declaration
    fn modifiers_of(&self, node: Node) -> Vec<Modifier> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.kind().ends_with("_modifier"))
            .filter_map(|c| Modifier::parse(&self.text(c).to_ascii_lowercase()))
            .collect()
    }
}

/// Members without a visibility keyword are public
fn with_implicit_visibility(mut modifiers: Vec<Modifier>) -> Vec<Modifier> {
    let has_visibility = modifiers
        .iter()
        .any(|m| matches!(m, Modifier::Public | Modifier::Protected | Modifier::Private));
    if !has_visibility {
        modifiers.insert(0, Modifier::Public);
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<CodeElement> {
        extract_elements("src/Mailer.php", source).unwrap()
    }

    #[test]
    fn class_members_and_namespace() {
        let source = r#"<?php
namespace App\Mail;

final class Mailer
{
    private $transport;

    public function send($message)
    {
        return $this->transport->deliver($message);
    }

    protected static function boot() {}
}
"#;
        let elements = extract(source);
        let summary: Vec<_> = elements
            .iter()
            .map(|e| (e.kind, e.name.as_str(), e.line))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ElementKind::Class, "Mailer", 4),
                (ElementKind::Property, "transport", 6),
                (ElementKind::Method, "send", 8),
                (ElementKind::Method, "boot", 13),
            ]
        );

        assert!(elements.iter().all(|e| e.namespace.as_deref() == Some("App\\Mail")));
        assert_eq!(elements[0].modifiers, vec![Modifier::Final]);
        assert!(elements[1].is_private());
        assert_eq!(elements[2].enclosing_type.as_deref(), Some("Mailer"));
        assert_eq!(elements[2].qualified_name(), "App\\Mail\\Mailer::send");
        assert!(elements[3].has_modifier(Modifier::Static));
        assert!(elements[3].has_modifier(Modifier::Protected));
    }

    #[test]
    fn members_default_to_public() {
        let source = "<?php\nclass A {\n    var $legacy;\n    function run() {}\n}\n";
        let elements = extract(source);
        let method = elements.iter().find(|e| e.name == "run").unwrap();
        assert_eq!(method.modifiers, vec![Modifier::Public]);
        assert!(method.should_be_documented());
    }

    #[test]
    fn interfaces_traits_and_functions() {
        let source = r#"<?php
interface Transport
{
    public function deliver($message);
}

trait Retries
{
    public $attempts = 3;
}

function mail_helper() {}
"#;
        let elements = extract(source);
        let summary: Vec<_> = elements
            .iter()
            .map(|e| (e.kind, e.name.as_str(), e.enclosing_type.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ElementKind::Interface, "Transport", None),
                (ElementKind::Method, "deliver", Some("Transport")),
                (ElementKind::Trait, "Retries", None),
                (ElementKind::Property, "attempts", Some("Retries")),
                (ElementKind::Function, "mail_helper", None),
            ]
        );
        assert!(elements.iter().all(|e| e.namespace.is_none()));
    }

    #[test]
    fn braced_namespaces_are_scoped() {
        let source = r#"<?php
namespace App\One {
    class First {}
}
namespace {
    class Second {}
}
"#;
        let elements = extract(source);
        assert_eq!(elements[0].qualified_name(), "App\\One\\First");
        assert_eq!(elements[1].qualified_name(), "Second");
    }

    #[test]
    fn one_property_per_element() {
        let source = "<?php\nclass Point {\n    public $x, $y;\n}\n";
        let names: Vec<_> = extract(source)
            .into_iter()
            .filter(|e| e.kind == ElementKind::Property)
            .map(|e| (e.name, e.line))
            .collect();
        assert_eq!(names, vec![("x".to_string(), 3), ("y".to_string(), 3)]);
    }

    #[test]
    fn enums_and_anonymous_classes_contribute_nothing() {
        let source = r#"<?php
namespace App;

enum Suit
{
    case Hearts;

    public function color(): string {}
}

function make()
{
}

return new class {
    public $label;

    public function render() {}
};
"#;
        let elements = extract(source);
        let names: Vec<_> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["make"]);
        assert!(
            elements
                .iter()
                .filter(|e| matches!(e.kind, ElementKind::Method | ElementKind::Property))
                .all(|e| e.enclosing_type.is_some())
        );
    }

    #[test]
    fn abstract_class_keeps_modifier() {
        let elements = extract("<?php\nabstract class Base {}\n");
        assert_eq!(elements[0].modifiers, vec![Modifier::Abstract]);
    }

    #[test]
    fn file_path_is_recorded() {
        let elements = extract_elements("lib/helpers.php", "<?php\nfunction h() {}\n").unwrap();
        assert_eq!(elements[0].file, "lib/helpers.php");
        assert!(is_php_file(std::path::Path::new("lib/helpers.php")));
        assert!(!is_php_file(std::path::Path::new("docs/helpers.md")));
    }
}
