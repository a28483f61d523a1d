//! Code elements: the documentable declarations extracted from source files

use facet::Facet;

/// The kind of a documentable declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Facet)]
#[repr(u8)]
pub enum ElementKind {
    /// A class declaration
    Class,
    /// An interface declaration
    Interface,
    /// A trait declaration
    Trait,
    /// A method declared inside a class, interface or trait
    Method,
    /// A free-standing function
    Function,
    /// A property declared inside a class or trait
    Property,
    /// A class constant
    Constant,
}

impl ElementKind {
    /// Every kind, in reporting order
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Class,
        ElementKind::Interface,
        ElementKind::Trait,
        ElementKind::Method,
        ElementKind::Function,
        ElementKind::Property,
        ElementKind::Constant,
    ];

    /// The kinds broken out in per-kind coverage tables
    pub const REPORTED: [ElementKind; 6] = [
        ElementKind::Class,
        ElementKind::Interface,
        ElementKind::Trait,
        ElementKind::Method,
        ElementKind::Function,
        ElementKind::Property,
    ];

    /// Parse a kind from its persisted string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "class" => Some(ElementKind::Class),
            "interface" => Some(ElementKind::Interface),
            "trait" => Some(ElementKind::Trait),
            "method" => Some(ElementKind::Method),
            "function" => Some(ElementKind::Function),
            "property" => Some(ElementKind::Property),
            "constant" => Some(ElementKind::Constant),
            _ => None,
        }
    }

    /// Get the string representation of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Class => "class",
            ElementKind::Interface => "interface",
            ElementKind::Trait => "trait",
            ElementKind::Method => "method",
            ElementKind::Function => "function",
            ElementKind::Property => "property",
            ElementKind::Constant => "constant",
        }
    }

    /// Capitalized label for tables
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Class => "Class",
            ElementKind::Interface => "Interface",
            ElementKind::Trait => "Trait",
            ElementKind::Method => "Method",
            ElementKind::Function => "Function",
            ElementKind::Property => "Property",
            ElementKind::Constant => "Constant",
        }
    }

    /// Class, interface or trait
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            ElementKind::Class | ElementKind::Interface | ElementKind::Trait
        )
    }

    /// Method, property or constant (declared inside a type)
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            ElementKind::Method | ElementKind::Property | ElementKind::Constant
        )
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility and other declaration modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
}

impl Modifier {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Modifier::Public),
            "protected" => Some(Modifier::Protected),
            "private" => Some(Modifier::Private),
            "static" => Some(Modifier::Static),
            "abstract" => Some(Modifier::Abstract),
            "final" => Some(Modifier::Final),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Final => "final",
        }
    }
}

/// A documentable declaration found in a source file
///
/// `(file, line, kind, name)` identifies an element across runs; the
/// `documented` flag is the only field that changes after extraction.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct CodeElement {
    /// Declared name (properties without the `$` sigil)
    pub name: String,
    /// What was declared
    pub kind: ElementKind,
    /// Declaring file, relative to the project root, `/`-separated
    pub file: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Enclosing namespace, if any
    pub namespace: Option<String>,
    /// Enclosing class/interface/trait name (members only)
    pub enclosing_type: Option<String>,
    /// Declaration modifiers in source order
    pub modifiers: Vec<Modifier>,
    /// Whether documentation refers to this element
    pub documented: bool,
}

impl CodeElement {
    pub fn new(
        name: impl Into<String>,
        kind: ElementKind,
        file: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            file: file.into(),
            line,
            namespace: None,
            enclosing_type: None,
            modifiers: Vec::new(),
            documented: false,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn in_type(mut self, enclosing_type: impl Into<String>) -> Self {
        self.enclosing_type = Some(enclosing_type.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    /// `Namespace\Name` for types and functions, `Namespace\Type::name` for members
    pub fn qualified_name(&self) -> String {
        let mut fqn = match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}\\"),
            _ => String::new(),
        };

        match &self.enclosing_type {
            Some(owner) if self.kind.is_member() => {
                fqn.push_str(owner);
                fqn.push_str("::");
                fqn.push_str(&self.name);
            }
            _ => fqn.push_str(&self.name),
        }

        fqn
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_private(&self) -> bool {
        self.has_modifier(Modifier::Private)
    }

    /// Types always need documentation; everything else unless it is private
    pub fn should_be_documented(&self) -> bool {
        self.kind.is_type() || !self.is_private()
    }

    pub fn mark_documented(&mut self) {
        self.documented = true;
    }

    pub fn identity(&self) -> Identity<'_> {
        Identity {
            file: &self.file,
            line: self.line,
            kind: self.kind,
            name: &self.name,
        }
    }
}

/// The stable `(file, line, kind, name)` identity of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity<'a> {
    pub file: &'a str,
    pub line: usize,
    pub kind: ElementKind,
    pub name: &'a str,
}

impl Identity<'_> {
    /// Deterministic digest of the identity tuple (BLAKE3, hex)
    pub fn hash(&self) -> String {
        let key = format!(
            "{}:{}:{}:{}",
            self.file,
            self.line,
            self.kind.as_str(),
            self.name
        );
        blake3::hash(key.as_bytes()).to_hex().to_string()
    }
}
