//! Candidate code references mined from documentation text

use facet::Facet;

/// What a documentation mention appears to point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum ReferenceKind {
    /// A namespace-qualified class name such as `App\Service\Mailer`
    Class,
    /// A method call such as `Mailer::send()` or `->send()`
    Method,
    /// A property access such as `->transport`
    Property,
    /// A markdown link to a source file
    Link,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Class => "class",
            ReferenceKind::Method => "method",
            ReferenceKind::Property => "property",
            ReferenceKind::Link => "link",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a reference was resolved to
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ResolvedLocation {
    /// Target file (relative to the project root when it lives inside it)
    pub file: String,
    /// Target line, when known
    pub line: Option<usize>,
}

/// A mention found in a documentation file
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct DocReference {
    /// Documentation file the mention was found in
    pub source_file: String,
    /// Line number (1-indexed)
    pub source_line: usize,
    /// What kind of mention this is
    pub kind: ReferenceKind,
    /// The mentioned text (class name, member name or link target)
    pub text: String,
    /// Set once by the matcher when the mention resolves
    pub resolved: Option<ResolvedLocation>,
}

impl DocReference {
    pub fn new(
        source_file: impl Into<String>,
        source_line: usize,
        kind: ReferenceKind,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            source_line,
            kind,
            text: text.into(),
            resolved: None,
        }
    }

    /// A reference is valid exactly when it has been resolved
    pub fn is_valid(&self) -> bool {
        self.resolved.is_some()
    }

    /// Attach the resolved location; the first resolution wins
    pub fn resolve(&mut self, file: impl Into<String>, line: Option<usize>) {
        if self.resolved.is_none() {
            self.resolved = Some(ResolvedLocation {
                file: file.into(),
                line,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_resolution_is_kept() {
        let mut reference = DocReference::new("docs/a.md", 3, ReferenceKind::Method, "send");
        assert!(!reference.is_valid());

        reference.resolve("src/Mailer.php", Some(12));
        reference.resolve("src/Other.php", Some(40));

        assert!(reference.is_valid());
        let resolved = reference.resolved.unwrap();
        assert_eq!(resolved.file, "src/Mailer.php");
        assert_eq!(resolved.line, Some(12));
    }
}
