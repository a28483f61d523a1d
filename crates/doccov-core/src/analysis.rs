//! The analysis pipeline: extract, match, filter, aggregate

use crate::baseline::Baseline;
use crate::catalog::SymbolCatalog;
use crate::coverage::{CoverageReport, CoverageScope};
use crate::docs::Document;
use crate::element::CodeElement;
use crate::extract::extract_references;
use crate::matching::{MatchStats, Matcher};
use crate::reference::DocReference;
use crate::sources::Corpus;
use std::path::PathBuf;
use tracing::debug;

/// Elements and references after matching, before any verdict
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub elements: Vec<CodeElement>,
    pub references: Vec<DocReference>,
    pub stats: MatchStats,
}

/// Runs the pipeline over a loaded [`Corpus`]
#[derive(Debug, Clone)]
pub struct Analyzer {
    root: PathBuf,
    scope: CoverageScope,
    baseline: Baseline,
}

impl Analyzer {
    /// `root` is the project root link targets are resolved against
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scope: CoverageScope::default(),
            baseline: Baseline::default(),
        }
    }

    pub fn scope(mut self, scope: CoverageScope) -> Self {
        self.scope = scope;
        self
    }

    /// Exempt baseline entries from the coverage population
    pub fn baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Extract references and resolve them against the elements
    pub fn resolve(&self, corpus: Corpus) -> Resolution {
        let Corpus {
            mut elements,
            documents,
            ..
        } = corpus;

        let mut references = extract_all(&documents);
        let catalog = SymbolCatalog::build(&elements);
        let stats = Matcher::new(&self.root).resolve(&catalog, &mut elements, &mut references);
        debug!(
            elements = elements.len(),
            references = references.len(),
            resolved = stats.resolved,
            unresolved = stats.unresolved,
            documented = stats.newly_documented,
            "matched documentation"
        );

        Resolution {
            elements,
            references,
            stats,
        }
    }

    /// Resolve, apply the baseline, and compute coverage
    ///
    /// Baseline entries leave the coverage population, but the report still
    /// lists every element found.
    pub fn analyze(&self, corpus: Corpus) -> CoverageReport {
        let Resolution {
            elements,
            references,
            ..
        } = self.resolve(corpus);

        if self.baseline.is_empty() {
            return CoverageReport::compute(elements, references, self.scope);
        }

        let counted = self.baseline.filter(elements.clone());
        debug!(exempt = elements.len() - counted.len(), "applied baseline");

        let mut report = CoverageReport::compute(counted, references, self.scope);
        report.elements = elements;
        report
    }
}

/// Extract references from every document, in document order
pub fn extract_all(documents: &[Document]) -> Vec<DocReference> {
    documents.iter().flat_map(extract_references).collect()
}
