//! Resolution of documentation references against the symbol catalog

use crate::catalog::SymbolCatalog;
use crate::element::CodeElement;
use crate::extract::LinkTarget;
use crate::reference::{DocReference, ReferenceKind, ResolvedLocation};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lines on each side of a link anchor whose elements a link documents
pub const LINK_WINDOW: usize = 10;

/// Outcome counts of one matching run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// References that resolved to an element or file
    pub resolved: usize,
    /// References left broken
    pub unresolved: usize,
    /// Elements whose `documented` flag flipped during this run
    pub newly_documented: usize,
}

/// Resolves references and marks the elements they point at as documented
#[derive(Debug, Clone)]
pub struct Matcher {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
}

impl Matcher {
    /// `root` is the project root link targets are resolved against
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let canonical_root = root.canonicalize().ok();
        Self {
            root,
            canonical_root,
        }
    }

    /// Resolve every reference in order
    ///
    /// Matching only ever sets flags: an element already documented stays
    /// documented, and a reference resolved earlier keeps its location.
    pub fn resolve(
        &self,
        catalog: &SymbolCatalog,
        elements: &mut [CodeElement],
        references: &mut [DocReference],
    ) -> MatchStats {
        debug_assert_eq!(catalog.len(), elements.len());
        let mut stats = MatchStats::default();

        for reference in references.iter_mut() {
            let newly = match reference.kind {
                ReferenceKind::Link => self.resolve_link(catalog, elements, reference),
                kind => resolve_symbol(catalog, elements, reference, kind),
            };
            stats.newly_documented += newly;
            if reference.is_valid() {
                stats.resolved += 1;
            } else {
                debug!(
                    file = %reference.source_file,
                    line = reference.source_line,
                    "unresolved {} reference `{}`",
                    reference.kind,
                    reference.text
                );
                stats.unresolved += 1;
            }
        }

        stats
    }

    fn resolve_link(
        &self,
        catalog: &SymbolCatalog,
        elements: &mut [CodeElement],
        reference: &mut DocReference,
    ) -> usize {
        let Some(location) = self.locate(&reference.text) else {
            return 0;
        };

        let mut newly = 0;
        for &idx in catalog.in_file(&location.file) {
            let element = &mut elements[idx];
            let in_window = location
                .line
                .is_none_or(|anchor| element.line.abs_diff(anchor) <= LINK_WINDOW);
            if in_window && !element.documented {
                element.mark_documented();
                newly += 1;
            }
        }

        reference.resolve(location.file, location.line);
        newly
    }

    /// Find the file a link target points at
    ///
    /// Leading `.` and `/` characters are stripped, then the path is tried
    /// under the root, under `root/src`, and as given.
    pub fn locate(&self, target: &str) -> Option<ResolvedLocation> {
        let link = LinkTarget::parse(target)?;
        let path = hosted_path(&link.path).unwrap_or(&link.path);
        let path = path.trim_start_matches(['.', '/']);
        if path.is_empty() {
            return None;
        }

        let candidates = [
            self.root.join(path),
            self.root.join("src").join(path),
            PathBuf::from(path),
        ];
        let found = candidates.iter().find(|c| c.exists())?;
        let canonical = found.canonicalize().ok()?;

        Some(ResolvedLocation {
            file: self.display_path(&canonical),
            line: link.line,
        })
    }

    /// Path relative to the project root with `/` separators, or absolute
    /// when the file lives outside it
    fn display_path(&self, path: &Path) -> String {
        let relative = self
            .canonical_root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }
}

fn resolve_symbol(
    catalog: &SymbolCatalog,
    elements: &mut [CodeElement],
    reference: &mut DocReference,
    kind: ReferenceKind,
) -> usize {
    let matches = catalog.lookup(elements, kind, &reference.text);
    let Some(&first) = matches.first() else {
        return 0;
    };

    let mut newly = 0;
    for &idx in &matches {
        if !elements[idx].documented {
            elements[idx].mark_documented();
            newly += 1;
        }
    }

    let target = &elements[first];
    reference.resolve(target.file.clone(), Some(target.line));
    newly
}

/// Repository path inside a hosting URL such as
/// `https://github.com/org/repo/blob/main/src/Foo.php`
fn hosted_path(url: &str) -> Option<&str> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return None;
    }
    let (_, after_blob) = url.split_once("/blob/")?;
    let (_, path) = after_blob.split_once('/')?;
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use std::fs;

    fn project() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("src/Mail")).unwrap();
        fs::write(tmp.path().join("src/Foo.php"), "<?php\n").unwrap();
        fs::write(tmp.path().join("src/Mail/Mailer.php"), "<?php\n").unwrap();
        tmp
    }

    fn foo_elements() -> Vec<CodeElement> {
        vec![
            CodeElement::new("Foo", ElementKind::Class, "src/Foo.php", 3),
            CodeElement::new("near", ElementKind::Method, "src/Foo.php", 20).in_type("Foo"),
            CodeElement::new("far", ElementKind::Method, "src/Foo.php", 21).in_type("Foo"),
            CodeElement::new("Mailer", ElementKind::Class, "src/Mail/Mailer.php", 5),
        ]
    }

    #[test]
    fn anchored_link_marks_window() {
        let tmp = project();
        let mut elements = foo_elements();
        let catalog = SymbolCatalog::build(&elements);
        let mut refs = vec![DocReference::new(
            "docs/a.md",
            1,
            ReferenceKind::Link,
            "../src/Foo.php#L10",
        )];

        let stats = Matcher::new(tmp.path()).resolve(&catalog, &mut elements, &mut refs);

        let documented: Vec<_> = elements.iter().map(|e| e.documented).collect();
        assert_eq!(documented, vec![true, true, false, false]);
        assert_eq!(stats.newly_documented, 2);
        assert_eq!(
            refs[0].resolved,
            Some(ResolvedLocation {
                file: "src/Foo.php".into(),
                line: Some(10)
            })
        );
    }

    #[test]
    fn plain_link_marks_whole_file() {
        let tmp = project();
        let mut elements = foo_elements();
        let catalog = SymbolCatalog::build(&elements);
        let mut refs = vec![DocReference::new("docs/a.md", 1, ReferenceKind::Link, "Foo.php")];

        Matcher::new(tmp.path()).resolve(&catalog, &mut elements, &mut refs);

        let documented: Vec<_> = elements.iter().map(|e| e.documented).collect();
        assert_eq!(documented, vec![true, true, true, false]);
    }

    #[test]
    fn hosted_links_resolve_repository_path() {
        let tmp = project();
        let matcher = Matcher::new(tmp.path());
        let location = matcher
            .locate("https://github.com/acme/app/blob/main/src/Mail/Mailer.php#L5")
            .unwrap();
        assert_eq!(location.file, "src/Mail/Mailer.php");
        assert_eq!(location.line, Some(5));
    }

    #[test]
    fn missing_link_target_is_broken() {
        let tmp = project();
        let mut elements = foo_elements();
        let catalog = SymbolCatalog::build(&elements);
        let mut refs = vec![DocReference::new(
            "docs/a.md",
            4,
            ReferenceKind::Link,
            "src/Gone.php",
        )];

        let stats = Matcher::new(tmp.path()).resolve(&catalog, &mut elements, &mut refs);

        assert!(!refs[0].is_valid());
        assert_eq!(stats.unresolved, 1);
        assert!(elements.iter().all(|e| !e.documented));
    }

    #[test]
    fn symbol_references_mark_all_matches_and_record_first() {
        let mut elements = vec![
            CodeElement::new("save", ElementKind::Method, "src/A.php", 4).in_type("A"),
            CodeElement::new("save", ElementKind::Method, "src/B.php", 8).in_type("B"),
        ];
        let catalog = SymbolCatalog::build(&elements);
        let mut refs = vec![
            DocReference::new("docs/a.md", 1, ReferenceKind::Method, "save"),
            DocReference::new("docs/a.md", 2, ReferenceKind::Method, "missing"),
        ];

        let stats = Matcher::new(".").resolve(&catalog, &mut elements, &mut refs);

        assert!(elements.iter().all(|e| e.documented));
        assert_eq!(
            stats,
            MatchStats {
                resolved: 1,
                unresolved: 1,
                newly_documented: 2
            }
        );
        let location = refs[0].resolved.as_ref().unwrap();
        assert_eq!(location.file, "src/A.php");
        assert_eq!(location.line, Some(4));
    }

    #[test]
    fn matching_is_monotonic() {
        let mut elements = vec![CodeElement::new("Widget", ElementKind::Class, "src/W.php", 1)];
        elements[0].mark_documented();
        let catalog = SymbolCatalog::build(&elements);
        let mut refs = vec![DocReference::new("docs/a.md", 1, ReferenceKind::Class, "Nothing")];

        let stats = Matcher::new(".").resolve(&catalog, &mut elements, &mut refs);

        assert!(elements[0].documented);
        assert_eq!(stats.newly_documented, 0);
    }

    #[test]
    fn more_references_never_document_less() {
        let tmp = project();
        let matcher = Matcher::new(tmp.path());
        let base = vec![
            DocReference::new("docs/a.md", 1, ReferenceKind::Class, "Mailer"),
            DocReference::new("docs/a.md", 2, ReferenceKind::Link, "../src/Foo.php#L10"),
        ];
        let extras = [
            DocReference::new("docs/a.md", 3, ReferenceKind::Method, "far"),
            DocReference::new("docs/a.md", 3, ReferenceKind::Class, "Foo"),
            DocReference::new("docs/a.md", 3, ReferenceKind::Link, "../src/Gone.php"),
        ];

        let run = |refs: &[DocReference]| {
            let mut elements = foo_elements();
            let catalog = SymbolCatalog::build(&elements);
            let mut refs = refs.to_vec();
            matcher.resolve(&catalog, &mut elements, &mut refs);
            elements.iter().map(|e| e.documented).collect::<Vec<_>>()
        };

        let before = run(&base);
        for extra in extras {
            let mut extended = base.clone();
            extended.push(extra);
            let after = run(&extended);

            let count = |flags: &[bool]| flags.iter().filter(|&&d| d).count();
            assert!(count(&after) >= count(&before));
            assert!(before.iter().zip(&after).all(|(b, a)| !b || *a));
        }
        assert_eq!(before, vec![true, true, false, true]);
    }

    #[test]
    fn hosted_path_extraction() {
        assert_eq!(
            hosted_path("https://gitlab.com/acme/app/-/blob/v1.2/lib/A.php"),
            Some("lib/A.php")
        );
        assert_eq!(hosted_path("src/blob/x/A.php"), None);
    }
}
