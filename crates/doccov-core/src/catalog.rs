//! Multi-key lookup index over code elements

use crate::element::{CodeElement, ElementKind};
use crate::reference::ReferenceKind;
use std::collections::{BTreeMap, HashMap};

/// Index over a slice of [`CodeElement`]s
///
/// Entries are positions into the slice the catalog was built from, so the
/// matcher can flip `documented` flags through a mutable borrow of that same
/// slice. Each key keeps every colliding element in insertion order.
#[derive(Debug, Default)]
pub struct SymbolCatalog {
    by_name: HashMap<String, Vec<usize>>,
    by_qualified: HashMap<String, Vec<usize>>,
    methods: HashMap<String, Vec<usize>>,
    properties: HashMap<String, Vec<usize>>,
    by_file: BTreeMap<String, Vec<usize>>,
    len: usize,
}

impl SymbolCatalog {
    /// Register every element under its bare name, its qualified name and,
    /// for methods and properties, a per-kind bucket
    pub fn build(elements: &[CodeElement]) -> Self {
        let mut catalog = Self {
            len: elements.len(),
            ..Self::default()
        };

        for (idx, element) in elements.iter().enumerate() {
            catalog
                .by_name
                .entry(element.name.clone())
                .or_default()
                .push(idx);
            catalog
                .by_qualified
                .entry(element.qualified_name())
                .or_default()
                .push(idx);
            match element.kind {
                ElementKind::Method => catalog
                    .methods
                    .entry(element.name.clone())
                    .or_default()
                    .push(idx),
                ElementKind::Property => catalog
                    .properties
                    .entry(element.name.clone())
                    .or_default()
                    .push(idx),
                _ => {}
            }
            catalog
                .by_file
                .entry(element.file.clone())
                .or_default()
                .push(idx);
        }

        catalog
    }

    /// Number of indexed elements
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Elements a textual mention of `kind` may refer to
    ///
    /// Returns positions without duplicates, in insertion order. A class
    /// mention only matches classes, never interfaces or traits. Links are
    /// resolved by file, not by name, and always return nothing here.
    pub fn lookup(&self, elements: &[CodeElement], kind: ReferenceKind, text: &str) -> Vec<usize> {
        let mut found = Vec::new();
        let mut push = |candidates: Option<&Vec<usize>>| {
            for &idx in candidates.into_iter().flatten() {
                if !found.contains(&idx) {
                    found.push(idx);
                }
            }
        };

        match kind {
            ReferenceKind::Class => {
                push(self.by_name.get(text));
                push(self.by_qualified.get(text));
                found.retain(|&idx| elements[idx].kind == ElementKind::Class);
            }
            ReferenceKind::Method => push(self.methods.get(text)),
            ReferenceKind::Property => {
                push(self.properties.get(text.strip_prefix('$').unwrap_or(text)))
            }
            ReferenceKind::Link => {}
        }

        found
    }

    /// Elements declared in `file`, in insertion order
    pub fn in_file(&self, file: &str) -> &[usize] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CodeElement> {
        vec![
            CodeElement::new("Widget", ElementKind::Class, "src/Widget.php", 5)
                .in_namespace("App"),
            CodeElement::new("render", ElementKind::Method, "src/Widget.php", 9)
                .in_namespace("App")
                .in_type("Widget"),
            CodeElement::new("Gadget", ElementKind::Class, "src/Gadget.php", 3),
            CodeElement::new("render", ElementKind::Method, "src/Gadget.php", 7)
                .in_type("Gadget"),
            CodeElement::new("color", ElementKind::Property, "src/Gadget.php", 5)
                .in_type("Gadget"),
            CodeElement::new("render", ElementKind::Function, "src/helpers.php", 1),
            CodeElement::new("Renderer", ElementKind::Interface, "src/Renderer.php", 3)
                .in_namespace("App"),
        ]
    }

    #[test]
    fn class_lookup_by_bare_or_qualified_name() {
        let elements = sample();
        let catalog = SymbolCatalog::build(&elements);
        assert_eq!(catalog.lookup(&elements, ReferenceKind::Class, "App\\Widget"), vec![0]);
        assert_eq!(catalog.lookup(&elements, ReferenceKind::Class, "Gadget"), vec![2]);
        assert!(catalog.lookup(&elements, ReferenceKind::Class, "render").is_empty());
    }

    #[test]
    fn class_mentions_never_match_interfaces() {
        let elements = sample();
        let catalog = SymbolCatalog::build(&elements);
        assert!(catalog.lookup(&elements, ReferenceKind::Class, "App\\Renderer").is_empty());
        assert!(catalog.lookup(&elements, ReferenceKind::Class, "Renderer").is_empty());
    }

    #[test]
    fn member_names_collide_across_types() {
        let elements = sample();
        let catalog = SymbolCatalog::build(&elements);
        assert_eq!(
            catalog.lookup(&elements, ReferenceKind::Method, "render"),
            vec![1, 3]
        );
    }

    #[test]
    fn property_lookup_strips_sigil() {
        let elements = sample();
        let catalog = SymbolCatalog::build(&elements);
        assert_eq!(catalog.lookup(&elements, ReferenceKind::Property, "$color"), vec![4]);
        assert_eq!(catalog.lookup(&elements, ReferenceKind::Property, "color"), vec![4]);
    }

    #[test]
    fn elements_grouped_by_file() {
        let elements = sample();
        let catalog = SymbolCatalog::build(&elements);
        assert_eq!(catalog.in_file("src/Gadget.php"), &[2, 3, 4]);
        assert!(catalog.in_file("src/Missing.php").is_empty());
        assert_eq!(catalog.len(), 7);
    }
}
