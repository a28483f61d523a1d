//! doccov-core - Core library for documentation coverage analysis of PHP codebases
//!
//! This crate provides the building blocks for:
//! - Extracting documentable declarations from PHP sources (via tree-sitter)
//! - Mining code references out of markdown documentation
//! - Matching references to declarations and computing coverage
//! - Maintaining a baseline of accepted, undocumented legacy code
//!
//! # Features
//!
//! - `walk` - Enable [`WalkSources`] for gitignore-aware directory walking (brings in `ignore` and `globset`)
//! - `parallel` - Parse files in parallel (brings in `rayon`)
//!
//! # What counts as a reference
//!
//! Documentation mentions are recognized in four ways:
//!
//! ```markdown
//! The App\Mail\Mailer class delivers messages.     <- qualified class name
//! Call Mailer::send() to deliver.                  <- static call on a mentioned class
//! Each ->compose() call returns a draft.           <- bare call near a mentioned class
//! [source](../src/Mail/Mailer.php#L12)             <- link to the source file
//! ```
//!
//! Member mentions only count when a qualified class name appears in the same
//! file (and, for bare calls and property access, within three lines).
//!
//! # Computing coverage
//!
//! ```
//! use doccov_core::{Analyzer, MemorySources, Sources};
//!
//! let corpus = MemorySources::new()
//!     .php("src/Widget.php", "<?php\nnamespace App;\nclass Widget {}\n")
//!     .doc("docs/index.md", "The App\\Widget class renders things.")
//!     .load()
//!     .unwrap();
//!
//! let report = Analyzer::new(".").analyze(corpus);
//! assert_eq!(report.total, 1);
//! assert_eq!(report.coverage_percent(), 100.0);
//! ```
//!
//! On disk, use [`WalkSources`]:
//!
//! ```ignore
//! use doccov_core::{Analyzer, Baseline, Sources, WalkSources};
//!
//! let corpus = WalkSources::new(".")
//!     .sources(["src/"])
//!     .docs(["docs/"])
//!     .exclude(["vendor/", "tests/"])
//!     .load()?;
//!
//! let baseline = Baseline::load(".doccov-baseline.yml".as_ref());
//! let report = Analyzer::new(".").baseline(baseline).analyze(corpus);
//! println!("Coverage: {:.1}%", report.coverage_percent());
//! ```

mod analysis;
mod baseline;
mod catalog;
mod coverage;
pub mod docs;
mod element;
pub mod extract;
mod matching;
pub mod php;
mod reference;
mod sources;

pub use analysis::{Analyzer, Resolution, extract_all};
pub use baseline::{
    BASELINE_VERSION, Baseline, BaselineEntry, BaselineValidation, DEFAULT_REASON,
};
pub use catalog::SymbolCatalog;
pub use coverage::{CoverageReport, CoverageScope, KindCoverage, group_by_file};
pub use docs::Document;
pub use element::{CodeElement, ElementKind, Identity, Modifier};
pub use matching::{LINK_WINDOW, MatchStats, Matcher};
pub use reference::{DocReference, ReferenceKind, ResolvedLocation};
pub use sources::{Corpus, MemorySources, Sources};

#[cfg(feature = "walk")]
pub use sources::WalkSources;
