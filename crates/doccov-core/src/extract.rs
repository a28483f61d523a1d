//! Reference extraction from documentation text
//!
//! Each documentation file goes through ordered passes:
//!
//! 1. qualified class names (`App\Service\Mailer`) on every line,
//! 2. the documented-class set built from pass 1,
//! 3. method calls and property accesses outside fenced code blocks, gated by
//!    the documented-class set,
//! 4. markdown links pointing at PHP sources.
//!
//! The exclusion lists and the context window below are part of the
//! heuristic's contract: changing them changes coverage numbers.

use crate::docs::{Document, LineState};
use crate::reference::{DocReference, ReferenceKind};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Final namespace segments that are never treated as class names
pub const COMMON_ACRONYMS: &[&str] = &[
    "PHP", "HTML", "JSON", "XML", "API", "CLI", "URL", "HTTP", "HTTPS", "CSS", "JS", "SQL", "CI",
    "CD", "CRUD", "UUID", "UTF", "ASCII",
];

/// Method names too generic to count as a reference on their own
pub const COMMON_METHODS: &[&str] = &[
    "get",
    "set",
    "has",
    "is",
    "add",
    "remove",
    "create",
    "delete",
    "update",
    "find",
    "save",
    "load",
    "run",
    "execute",
    "call",
    "apply",
    "bind",
    "clone",
    "__construct",
    "__destruct",
    "__get",
    "__set",
    "__call",
    "__toString",
];

/// Variable names too generic to count as a property reference.
/// Compared against the captured token including its optional `$` sigil.
pub const COMMON_VARIABLES: &[&str] = &[
    "$this",
    "$self",
    "$static",
    "$parent",
    "$id",
    "$name",
    "$data",
    "$config",
    "$request",
    "$response",
    "$session",
    "$user",
    "$item",
    "$value",
    "$key",
];

/// Lines on each side of a member mention searched for a documented class
pub const CONTEXT_WINDOW: usize = 3;

/// Source file extension recognized in links
pub const SOURCE_EXTENSION: &str = "php";

static QUALIFIED_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\?([A-Z][a-zA-Z0-9_]*(?:\\[A-Z][a-zA-Z0-9_]*)+)").expect("Invalid regex")
});

static METHOD_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-Z][a-zA-Z0-9_]*)::([a-zA-Z_][a-zA-Z0-9_]*)\s*\(|(?:->|::)([a-zA-Z_][a-zA-Z0-9_]*)\s*\(",
    )
    .expect("Invalid regex")
});

static MEMBER_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:->|::)(\$?[a-zA-Z_][a-zA-Z0-9_]*)").expect("Invalid regex")
});

static CODE_LIKE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\$|//|/\*|\*|#)").expect("Invalid regex"));

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("Invalid regex"));

static SOURCE_FILE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.php(?:#.*)?$").expect("Invalid regex"));

static SOURCE_DIR_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\.\.?/)*src/.*\.php").expect("Invalid regex"));

static HOSTED_LINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:github\.com|gitlab\.com).*#L\d+").expect("Invalid regex")
});

static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+\.php)(?:#L(\d+))?$").expect("Invalid regex"));

/// Extract every candidate reference from one documentation file
///
/// References come out grouped by pass: classes, then members, then links.
pub fn extract_references(doc: &Document) -> Vec<DocReference> {
    let mut references = class_references(doc);
    let documented = DocumentedClasses::from_references(&references);
    references.extend(member_references(doc, &documented));
    references.extend(link_references(doc));
    references
}

/// Pass 1: namespace-qualified class names, fenced blocks included
pub fn class_references(doc: &Document) -> Vec<DocReference> {
    let mut references = Vec::new();

    for line in doc.scan() {
        for caps in QUALIFIED_CLASS.captures_iter(line.text) {
            let class_name = &caps[1];
            if is_common_acronym(class_name) {
                continue;
            }
            references.push(DocReference::new(
                &doc.path,
                line.number,
                ReferenceKind::Class,
                class_name,
            ));
        }
    }

    references
}

/// Whether the last namespace segment is an excluded acronym (`Vendor\API`)
pub fn is_common_acronym(class_name: &str) -> bool {
    let last = class_name.rsplit('\\').next().unwrap_or(class_name);
    COMMON_ACRONYMS.contains(&last)
}

/// Class names a documentation file has explicitly mentioned
///
/// Holds both the qualified name and its trailing segment, so
/// `App\Mail\Mailer` admits `Mailer::send()` as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentedClasses {
    names: BTreeSet<String>,
}

impl DocumentedClasses {
    /// Pass 2: collect class names from pass 1 output
    pub fn from_references(references: &[DocReference]) -> Self {
        let mut names = BTreeSet::new();
        for reference in references {
            if reference.kind != ReferenceKind::Class {
                continue;
            }
            let full = reference.text.as_str();
            names.insert(full.to_string());
            if let Some(short) = full.rsplit('\\').next() {
                names.insert(short.to_string());
            }
        }
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether any documented class name occurs anywhere in `text`
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.names.iter().any(|name| text.contains(name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Pass 3: method and property mentions outside fenced code blocks
pub fn member_references(doc: &Document, documented: &DocumentedClasses) -> Vec<DocReference> {
    let mut references = Vec::new();

    for line in doc.scan() {
        if line.state != LineState::Prose {
            continue;
        }

        for caps in METHOD_CALL.captures_iter(line.text) {
            if let (Some(class), Some(method)) = (caps.get(1), caps.get(2)) {
                // Statically qualified: Class::method(
                if documented.contains(class.as_str()) {
                    references.push(DocReference::new(
                        &doc.path,
                        line.number,
                        ReferenceKind::Method,
                        method.as_str(),
                    ));
                }
            } else if let Some(method) = caps.get(3) {
                // Bare: ->method( or ::method(
                let method = method.as_str();
                if !COMMON_METHODS.contains(&method)
                    && in_documented_context(doc, line.index, documented)
                {
                    references.push(DocReference::new(
                        &doc.path,
                        line.number,
                        ReferenceKind::Method,
                        method,
                    ));
                }
            }
        }

        if CODE_LIKE_LINE.is_match(line.text) {
            continue;
        }

        for caps in MEMBER_ACCESS.captures_iter(line.text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if line.text[whole.end()..].trim_start().starts_with('(') {
                continue;
            }
            let property = name.as_str();
            if COMMON_VARIABLES.contains(&property) {
                continue;
            }
            if in_documented_context(doc, line.index, documented) {
                references.push(DocReference::new(
                    &doc.path,
                    line.number,
                    ReferenceKind::Property,
                    property,
                ));
            }
        }
    }

    references
}

/// Whether the line at `index`, or one within [`CONTEXT_WINDOW`] lines of
/// it, mentions a documented class
fn in_documented_context(doc: &Document, index: usize, documented: &DocumentedClasses) -> bool {
    if documented.is_empty() || doc.lines.is_empty() {
        return false;
    }
    let start = index.saturating_sub(CONTEXT_WINDOW);
    let end = (index + CONTEXT_WINDOW).min(doc.lines.len() - 1);
    doc.lines[start..=end]
        .iter()
        .any(|line| documented.mentioned_in(line))
}

/// Pass 4: markdown links whose target looks like PHP source
pub fn link_references(doc: &Document) -> Vec<DocReference> {
    let mut references = Vec::new();

    for line in doc.scan() {
        for caps in MARKDOWN_LINK.captures_iter(line.text) {
            let target = &caps[2];
            if is_code_link(target) {
                references.push(DocReference::new(
                    &doc.path,
                    line.number,
                    ReferenceKind::Link,
                    target,
                ));
            }
        }
    }

    references
}

/// Whether a link target points at source code
pub fn is_code_link(target: &str) -> bool {
    SOURCE_FILE_LINK.is_match(target)
        || SOURCE_DIR_LINK.is_match(target)
        || HOSTED_LINE_LINK.is_match(target)
}

/// A link target split into file path and optional line anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub path: String,
    pub line: Option<usize>,
}

impl LinkTarget {
    /// Parse `<path>.php` with an optional `#L<digits>` anchor
    pub fn parse(target: &str) -> Option<Self> {
        let caps = LINK_TARGET.captures(target)?;
        let path = caps.get(1)?.as_str().to_string();
        let line = caps.get(2).and_then(|m| m.as_str().parse().ok());
        Some(Self { path, line })
    }
}
