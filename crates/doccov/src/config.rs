//! Configuration schema for doccov
//!
//! Config lives at `doccov.yml` in the analyzed project. Every key is
//! optional; command-line flags override file values only when given.

use crate::output::OutputFormat;
use doccov_core::CoverageScope;
use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default config file name, relative to the project path
pub const DEFAULT_CONFIG_FILE: &str = "doccov.yml";

pub const DEFAULT_MINIMUM_COVERAGE: f64 = 80.0;

/// Config file contents as written by the user
#[derive(Debug, Clone, Default, Facet)]
pub struct FileConfig {
    /// Directories containing PHP sources, e.g. `["src/"]`
    #[facet(default)]
    pub source_paths: Option<Vec<String>>,

    /// Directories containing markdown documentation, e.g. `["docs/"]`
    #[facet(default)]
    pub docs_paths: Option<Vec<String>>,

    /// Directories or globs to skip, e.g. `["vendor/", "tests/"]`
    #[facet(default)]
    pub exclude_paths: Option<Vec<String>>,

    /// `console`, `json`, `html` or `markdown`
    #[facet(default)]
    pub output_format: Option<String>,

    /// Where to write the report (relative to the project)
    #[facet(default)]
    pub output_file: Option<String>,

    /// Coverage percentage required to pass
    #[facet(default)]
    pub minimum_coverage: Option<f64>,

    /// `elements` or `classes`
    #[facet(default)]
    pub coverage_scope: Option<String>,

    /// Baseline file (relative to the project)
    #[facet(default)]
    pub baseline_file: Option<String>,
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_paths: Vec<String>,
    pub docs_paths: Vec<String>,
    pub exclude_paths: Vec<String>,
    pub output_format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
    pub minimum_coverage: Option<f64>,
    pub coverage_scope: Option<String>,
    pub baseline_file: Option<PathBuf>,
}

/// Effective settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub source_paths: Vec<String>,
    pub docs_paths: Vec<String>,
    pub exclude_paths: Vec<String>,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub minimum_coverage: f64,
    pub coverage_scope: CoverageScope,
    pub baseline_file: Option<PathBuf>,
}

impl Config {
    /// Merge file values, command-line overrides and defaults
    ///
    /// Paths from the file are relative to the project root; paths from the
    /// command line are used as given.
    pub fn resolve(project_root: impl Into<PathBuf>, file: FileConfig, cli: Overrides) -> Self {
        let project_root = project_root.into();

        let pick = |cli: Vec<String>, file: Option<Vec<String>>, default: &[&str]| {
            if !cli.is_empty() {
                cli
            } else {
                file.unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
            }
        };

        let output_format = cli.output_format.unwrap_or_else(|| {
            file.output_format
                .as_deref()
                .map(|f| {
                    OutputFormat::from_str(f).unwrap_or_else(|| {
                        warn!("Unknown output format `{f}`, using console");
                        OutputFormat::Console
                    })
                })
                .unwrap_or_default()
        });

        let from_file = |path: Option<String>| {
            path.filter(|p| !p.is_empty())
                .map(|p| project_root.join(p))
        };
        let output_file = cli.output_file.or_else(|| from_file(file.output_file));
        let baseline_file = cli.baseline_file.or_else(|| from_file(file.baseline_file));

        let coverage_scope = cli
            .coverage_scope
            .or(file.coverage_scope)
            .map(|s| CoverageScope::parse(&s))
            .unwrap_or_default();

        Config {
            source_paths: pick(cli.source_paths, file.source_paths, &["src/"]),
            docs_paths: pick(cli.docs_paths, file.docs_paths, &["docs/"]),
            exclude_paths: pick(cli.exclude_paths, file.exclude_paths, &["vendor/", "tests/"]),
            output_format,
            output_file,
            minimum_coverage: cli
                .minimum_coverage
                .or(file.minimum_coverage)
                .unwrap_or(DEFAULT_MINIMUM_COVERAGE),
            coverage_scope,
            baseline_file,
            project_root,
        }
    }
}

/// Load the config file at `path`
///
/// A missing file yields the defaults; a file that exists but does not parse
/// is an error.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        debug!("no config file at {}", path.display());
        return Ok(FileConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    let config: FileConfig = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
