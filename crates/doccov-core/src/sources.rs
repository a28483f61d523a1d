//! Source providers: where PHP files and documentation come from

use crate::docs::{Document, is_doc_file};
use crate::element::CodeElement;
use crate::php::{extract_elements, is_php_file};
use eyre::Result;
#[cfg(feature = "walk")]
use eyre::WrapErr;
#[cfg(feature = "walk")]
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything the engine needs from the outside world
#[derive(Debug, Default)]
pub struct Corpus {
    /// Extracted declarations, grouped by file in sorted path order
    pub elements: Vec<CodeElement>,
    /// Documentation files in sorted path order
    pub documents: Vec<Document>,
    /// Files or roots that were skipped
    pub warnings: Vec<String>,
}

/// Trait for providing PHP sources and documentation files
pub trait Sources {
    /// Parse every source file and read every documentation file
    fn load(self) -> Result<Corpus>;
}

/// In-memory sources (useful for testing and embedding)
#[derive(Debug, Default)]
pub struct MemorySources {
    php: Vec<(String, String)>,
    docs: Vec<(String, String)>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a PHP file with content
    pub fn php(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.php.push((path.into(), content.into()));
        self
    }

    /// Add a documentation file with content
    pub fn doc(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.docs.push((path.into(), content.into()));
        self
    }
}

impl Sources for MemorySources {
    fn load(mut self) -> Result<Corpus> {
        self.php.sort_by(|a, b| a.0.cmp(&b.0));
        self.docs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut corpus = Corpus::default();
        for (path, content) in &self.php {
            match extract_elements(path, content) {
                Ok(elements) => corpus.elements.extend(elements),
                Err(e) => {
                    warn!(file = %path, "skipping unparsable source: {e}");
                    corpus.warnings.push(format!("{path}: {e}"));
                }
            }
        }
        corpus.documents = self
            .docs
            .iter()
            .map(|(path, content)| Document::new(path.as_str(), content))
            .collect();
        Ok(corpus)
    }
}

/// Gitignore-aware walker over source and documentation roots
#[cfg(feature = "walk")]
#[derive(Debug, Clone)]
pub struct WalkSources {
    root: PathBuf,
    source_paths: Vec<String>,
    docs_paths: Vec<String>,
    exclude: Vec<String>,
}

#[cfg(feature = "walk")]
impl WalkSources {
    /// Create a walker for the given project root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source_paths: Vec::new(),
            docs_paths: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Add source directories, relative to the root (e.g. `["src/"]`)
    pub fn sources(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.source_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add documentation directories, relative to the root (e.g. `["docs/"]`)
    pub fn docs(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.docs_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add excluded directories or globs (e.g. `["vendor/", "**/Fixtures/**"]`)
    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Collect files under the configured roots that pass `keep`, sorted
    fn collect(
        &self,
        roots: &[String],
        keep: fn(&Path) -> bool,
        excludes: &Excludes,
        warnings: &mut Vec<String>,
    ) -> Vec<PathBuf> {
        use ignore::WalkBuilder;

        let mut files = std::collections::BTreeSet::new();
        for root in roots {
            let dir = self.root.join(root.trim_start_matches('/'));
            if !dir.exists() {
                let warning = format!("Path not found: {}", dir.display());
                warn!("{warning}");
                warnings.push(warning);
                continue;
            }

            let project_root = self.root.clone();
            let excludes = excludes.clone();
            let walker = WalkBuilder::new(&dir)
                .follow_links(true)
                .hidden(false)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .filter_entry(move |entry| {
                    !excludes.matches(&relative_path(&project_root, entry.path()))
                })
                .build();

            for entry in walker.flatten() {
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) && keep(path) {
                    files.insert(path.to_path_buf());
                }
            }
        }
        files.into_iter().collect()
    }
}

#[cfg(feature = "walk")]
impl Sources for WalkSources {
    fn load(self) -> Result<Corpus> {
        let excludes = Excludes::new(&self.exclude)?;
        let mut warnings = Vec::new();

        let php_files = self.collect(&self.source_paths, is_php_file, &excludes, &mut warnings);
        let doc_files = self.collect(&self.docs_paths, is_doc_file, &excludes, &mut warnings);
        debug!(
            php = php_files.len(),
            docs = doc_files.len(),
            "collected input files"
        );

        let parse = |path: &PathBuf| -> Result<Vec<CodeElement>> {
            let relative = relative_path(&self.root, path);
            let content = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            debug!(file = %relative, "parsing");
            extract_elements(&relative, &content)
        };
        let read = |path: &PathBuf| -> Result<Document> {
            let content = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            Ok(Document::new(relative_path(&self.root, path), &content))
        };

        #[cfg(feature = "parallel")]
        let (parsed, read_docs): (Vec<_>, Vec<_>) = {
            use rayon::prelude::*;
            (
                php_files.par_iter().map(parse).collect(),
                doc_files.par_iter().map(read).collect(),
            )
        };

        #[cfg(not(feature = "parallel"))]
        let (parsed, read_docs): (Vec<_>, Vec<_>) = (
            php_files.iter().map(parse).collect(),
            doc_files.iter().map(read).collect(),
        );

        let mut corpus = Corpus::default();
        for result in parsed {
            match result {
                Ok(elements) => corpus.elements.extend(elements),
                Err(e) => {
                    warn!("skipping source file: {e:#}");
                    warnings.push(format!("{e:#}"));
                }
            }
        }
        for result in read_docs {
            match result {
                Ok(doc) => corpus.documents.push(doc),
                Err(e) => {
                    warn!("skipping documentation file: {e:#}");
                    warnings.push(format!("{e:#}"));
                }
            }
        }
        corpus.warnings = warnings;
        Ok(corpus)
    }
}

/// `path` relative to `root` with `/` separators, or as given when outside it
#[cfg(feature = "walk")]
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

/// Compiled exclusion patterns
///
/// A plain pattern such as `vendor/` excludes that directory relative to the
/// project root and any directory with the same name deeper down; patterns
/// containing `*` are globs matched against the relative path.
#[cfg(feature = "walk")]
#[derive(Debug, Clone, Default)]
struct Excludes {
    dirs: Vec<String>,
    globs: Option<globset::GlobSet>,
}

#[cfg(feature = "walk")]
impl Excludes {
    fn new(patterns: &[String]) -> Result<Self> {
        let mut dirs = Vec::new();
        let mut globs = globset::GlobSetBuilder::new();
        let mut has_globs = false;

        for pattern in patterns {
            let pattern = pattern.replace('\\', "/");
            if pattern.contains('*') {
                let glob = globset::Glob::new(&pattern)
                    .wrap_err_with(|| format!("Invalid exclude pattern: {pattern}"))?;
                globs.add(glob);
                has_globs = true;
            } else {
                let dir = pattern.trim_start_matches("./").trim_matches('/');
                if !dir.is_empty() {
                    dirs.push(dir.to_string());
                }
            }
        }

        let globs = if has_globs {
            Some(globs.build().wrap_err("Invalid exclude patterns")?)
        } else {
            None
        };
        Ok(Self { dirs, globs })
    }

    fn matches(&self, relative: &str) -> bool {
        let by_dir = self.dirs.iter().any(|dir| {
            relative == dir
                || relative.starts_with(&format!("{dir}/"))
                || dir
                    .rsplit('/')
                    .next()
                    .is_some_and(|name| relative.split('/').any(|part| part == name))
        });
        by_dir || self.globs.as_ref().is_some_and(|g| g.is_match(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn memory_sources_sort_by_path() {
        let corpus = MemorySources::new()
            .php("src/B.php", "<?php\nclass B {}\n")
            .php("src/A.php", "<?php\nclass A {}\n")
            .doc("docs/z.md", "Z")
            .doc("docs/a.md", "A")
            .load()
            .unwrap();

        let names: Vec<_> = corpus.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let docs: Vec<_> = corpus.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(docs, vec!["docs/a.md", "docs/z.md"]);
        assert!(corpus.warnings.is_empty());
    }

    #[cfg(feature = "walk")]
    mod walk {
        use super::*;
        use std::fs;

        fn write(root: &Path, path: &str, content: &str) {
            let full = root.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }

        #[test]
        fn walks_sources_and_docs_with_relative_paths() {
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path();
            write(root, "src/Mail/Mailer.php", "<?php\nclass Mailer {}\n");
            write(root, "src/notes.txt", "not php");
            write(root, "docs/guide.md", "App\\Mail\\Mailer");
            write(root, "docs/extra.markdown", "more");

            let corpus = WalkSources::new(root)
                .sources(["src/"])
                .docs(["docs/"])
                .load()
                .unwrap();

            assert_eq!(corpus.elements.len(), 1);
            assert_eq!(corpus.elements[0].file, "src/Mail/Mailer.php");
            assert_eq!(corpus.elements[0].kind, ElementKind::Class);
            let docs: Vec<_> = corpus.documents.iter().map(|d| d.path.as_str()).collect();
            assert_eq!(docs, vec!["docs/extra.markdown", "docs/guide.md"]);
        }

        #[test]
        fn excluded_directories_are_skipped() {
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path();
            write(root, "src/Kept.php", "<?php\nclass Kept {}\n");
            write(root, "src/vendor/Lib.php", "<?php\nclass Lib {}\n");
            write(root, "src/Fixtures/Fake.php", "<?php\nclass Fake {}\n");

            let corpus = WalkSources::new(root)
                .sources(["src/"])
                .exclude(["vendor/", "**/Fixtures/**"])
                .load()
                .unwrap();

            let names: Vec<_> = corpus.elements.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["Kept"]);
        }

        #[test]
        fn missing_roots_are_warnings() {
            let tmp = tempfile::tempdir().unwrap();
            let corpus = WalkSources::new(tmp.path())
                .sources(["src/"])
                .docs(["docs/"])
                .load()
                .unwrap();

            assert!(corpus.elements.is_empty());
            assert_eq!(corpus.warnings.len(), 2);
            assert!(corpus.warnings[0].contains("Path not found"));
        }

        #[test]
        fn exclude_matching() {
            let excludes = Excludes::new(&["vendor/".to_string(), "./build".to_string()]).unwrap();
            assert!(excludes.matches("vendor"));
            assert!(excludes.matches("src/vendor"));
            assert!(excludes.matches("build/cache"));
            assert!(!excludes.matches("src/vendors"));
        }
    }
}
