//! Coverage analysis and reporting

use crate::element::{CodeElement, ElementKind};
use crate::reference::DocReference;
use facet::Facet;
use std::collections::BTreeMap;

/// Which elements count toward the coverage percentage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum CoverageScope {
    /// Every element that should be documented
    #[default]
    Elements,
    /// Only classes, interfaces and traits
    Classes,
}

impl CoverageScope {
    /// Parse a scope name; anything unrecognized means `Elements`
    pub fn parse(s: &str) -> Self {
        match s {
            "classes" => CoverageScope::Classes,
            _ => CoverageScope::Elements,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageScope::Elements => "elements",
            CoverageScope::Classes => "classes",
        }
    }

    fn includes(&self, kind: ElementKind) -> bool {
        match self {
            CoverageScope::Elements => true,
            CoverageScope::Classes => kind.is_type(),
        }
    }
}

impl std::fmt::Display for CoverageScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coverage of a single element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct KindCoverage {
    pub kind: ElementKind,
    pub total: usize,
    pub documented: usize,
}

impl KindCoverage {
    pub fn undocumented(&self) -> usize {
        self.total - self.documented
    }

    pub fn coverage_percent(&self) -> f64 {
        percent(self.documented, self.total)
    }
}

/// Final coverage numbers for one run; immutable once computed
#[derive(Debug, Clone)]
pub struct CoverageReport {
    /// Every element found, including ones exempted by a baseline
    pub elements: Vec<CodeElement>,
    /// Every extracted reference, resolved or not
    pub references: Vec<DocReference>,
    pub scope: CoverageScope,
    /// Size of the population that should be documented
    pub total: usize,
    /// Documented members of that population
    pub documented: usize,
    /// Undocumented members of that population, in element order
    pub undocumented: Vec<CodeElement>,
    /// References that resolved to nothing
    pub broken_references: Vec<DocReference>,
    /// Per-kind breakdown over all elements that should be documented
    pub by_kind: Vec<KindCoverage>,
}

impl CoverageReport {
    /// Compute coverage from resolved elements and references
    pub fn compute(
        elements: Vec<CodeElement>,
        references: Vec<DocReference>,
        scope: CoverageScope,
    ) -> Self {
        let population: Vec<&CodeElement> = elements
            .iter()
            .filter(|e| e.should_be_documented() && scope.includes(e.kind))
            .collect();

        let total = population.len();
        let documented = population.iter().filter(|e| e.documented).count();
        let undocumented = population
            .iter()
            .filter(|e| !e.documented)
            .map(|e| (*e).clone())
            .collect();

        let by_kind = ElementKind::REPORTED
            .iter()
            .map(|&kind| {
                let of_kind = elements
                    .iter()
                    .filter(|e| e.kind == kind && e.should_be_documented());
                let (total, documented) = of_kind.fold((0, 0), |(t, d), e| {
                    (t + 1, d + usize::from(e.documented))
                });
                KindCoverage {
                    kind,
                    total,
                    documented,
                }
            })
            .collect();

        let broken_references = references
            .iter()
            .filter(|r| !r.is_valid())
            .cloned()
            .collect();

        CoverageReport {
            elements,
            references,
            scope,
            total,
            documented,
            undocumented,
            broken_references,
            by_kind,
        }
    }

    /// Coverage percentage (0.0 - 100.0); an empty population is fully covered
    pub fn coverage_percent(&self) -> f64 {
        percent(self.documented, self.total)
    }

    pub fn undocumented_count(&self) -> usize {
        self.total - self.documented
    }

    /// Undocumented classes, interfaces and traits
    pub fn undocumented_classes(&self) -> impl Iterator<Item = &CodeElement> {
        self.undocumented.iter().filter(|e| e.kind.is_type())
    }

    /// Whether coverage meets `minimum`
    ///
    /// Broken references are reported but never fail the verdict.
    pub fn is_successful(&self, minimum: f64) -> bool {
        self.coverage_percent() >= minimum
    }

    pub fn has_broken_references(&self) -> bool {
        !self.broken_references.is_empty()
    }

    /// Coverage for one kind
    pub fn kind(&self, kind: ElementKind) -> Option<&KindCoverage> {
        self.by_kind.iter().find(|k| k.kind == kind)
    }
}

/// Group elements by declaring file, files sorted
pub fn group_by_file<'a>(
    elements: impl IntoIterator<Item = &'a CodeElement>,
) -> BTreeMap<&'a str, Vec<&'a CodeElement>> {
    let mut grouped: BTreeMap<&str, Vec<&CodeElement>> = BTreeMap::new();
    for element in elements {
        grouped.entry(element.file.as_str()).or_default().push(element);
    }
    grouped
}

fn percent(documented: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (documented as f64 / total as f64) * 100.0
}
