//! doccov - Measure documentation coverage of PHP codebases
//!
//! doccov parses PHP sources for classes, methods, properties and functions,
//! mines the project's markdown documentation for mentions of them, and
//! reports which declarations are never documented.

use doccov::cli::{BaselineCommands, Commands, DoccovCli, RunArgs};
use doccov::config::{Config, DEFAULT_CONFIG_FILE, load_config};
use doccov::output::{OutputFormat, render_report};
use doccov_core::{Analyzer, Baseline, Corpus, Sources, WalkSources};
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = DoccovCli::parse_args();

    match cli.command {
        None => {
            init_tracing(cli.run.verbose);
            run_report_command(&cli.run)
        }
        Some(Commands::Baseline { action }) => match action {
            BaselineCommands::Generate { run, reason } => {
                init_tracing(run.verbose);
                run_baseline_generate(&run, &reason)
            }
            BaselineCommands::Update { run } => {
                init_tracing(run.verbose);
                run_baseline_update(&run)
            }
            BaselineCommands::Validate { run } => {
                init_tracing(run.verbose);
                run_baseline_validate(&run)
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the project's config file with the command-line flags
fn load_settings(run: &RunArgs) -> Result<Config> {
    if !run.path.is_dir() {
        eyre::bail!("Project path is not a directory: {}", run.path.display());
    }

    let config_path = run
        .config
        .as_ref()
        .map(|c| run.path.join(c))
        .unwrap_or_else(|| run.path.join(DEFAULT_CONFIG_FILE));

    let file = load_config(&config_path)?;
    Ok(Config::resolve(&run.path, file, run.overrides()))
}

fn load_corpus(config: &Config) -> Result<Corpus> {
    eprintln!("{} Scanning project files...", "->".blue().bold());

    let corpus = WalkSources::new(&config.project_root)
        .sources(config.source_paths.iter().cloned())
        .docs(config.docs_paths.iter().cloned())
        .exclude(config.exclude_paths.iter().cloned())
        .load()
        .wrap_err("Failed to load project files")?;

    eprintln!(
        "   Found {} code elements in sources and {} documentation files",
        corpus.elements.len().to_string().green(),
        corpus.documents.len().to_string().green()
    );

    if !corpus.warnings.is_empty() {
        eprintln!(
            "{} {} warnings:",
            "!".yellow().bold(),
            corpus.warnings.len()
        );
        for warning in &corpus.warnings {
            eprintln!("   {}", warning);
        }
    }

    Ok(corpus)
}

fn analyzer(config: &Config) -> Analyzer {
    Analyzer::new(&config.project_root).scope(config.coverage_scope)
}

fn require_baseline_path(config: &Config) -> Result<&Path> {
    config.baseline_file.as_deref().ok_or_else(|| {
        eyre::eyre!("No baseline file given - pass --baseline or set baseline_file in the config")
    })
}

fn run_report_command(run: &RunArgs) -> Result<()> {
    let config = load_settings(run)?;
    let corpus = load_corpus(&config)?;

    let mut analyzer = analyzer(&config);
    if let Some(path) = &config.baseline_file {
        let baseline = Baseline::load(path);
        eprintln!(
            "{} Loaded {} baseline entries from {}",
            "->".blue().bold(),
            baseline.len().to_string().green(),
            path.display()
        );
        analyzer = analyzer.baseline(baseline);
    }

    eprintln!("{} Matching documentation...", "->".blue().bold());
    let report = analyzer.analyze(corpus);

    let output = render_report(&report, config.output_format, config.minimum_coverage)?;
    write_output(&output, config.output_file.as_deref(), config.output_format)?;

    if !report.is_successful(config.minimum_coverage) {
        std::process::exit(1);
    }

    Ok(())
}

fn write_output(output: &str, path: Option<&Path>, format: OutputFormat) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, output)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} report to {}",
                "OK".green().bold(),
                format.as_str(),
                path.display()
            );
        }
        None => print!("{}", output),
    }
    Ok(())
}

fn run_baseline_generate(run: &RunArgs, reason: &str) -> Result<()> {
    let config = load_settings(run)?;
    let path = require_baseline_path(&config)?.to_path_buf();
    let corpus = load_corpus(&config)?;

    eprintln!("{} Matching documentation...", "->".blue().bold());
    let resolution = analyzer(&config).resolve(corpus);
    let baseline = Baseline::generate(&resolution.elements, reason);

    if baseline.is_empty() {
        eprintln!(
            "{} All elements are documented! No baseline needed.",
            "OK".green().bold()
        );
        return Ok(());
    }

    baseline.save(&path)?;

    let files = baseline
        .entries
        .iter()
        .map(|e| e.file.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    eprintln!(
        "{} Wrote baseline to {}",
        "OK".green().bold(),
        path.display()
    );
    eprintln!("   Total entries: {}", baseline.len().to_string().green());
    eprintln!("   Files covered: {}", files.to_string().green());

    Ok(())
}

fn existing_baseline(config: &Config) -> Result<(PathBuf, Baseline)> {
    let path = require_baseline_path(config)?.to_path_buf();
    if !path.exists() {
        eyre::bail!("Baseline file not found: {}", path.display());
    }
    let baseline = Baseline::load(&path);
    Ok((path, baseline))
}

fn run_baseline_update(run: &RunArgs) -> Result<()> {
    let config = load_settings(run)?;
    let (path, baseline) = existing_baseline(&config)?;
    let corpus = load_corpus(&config)?;

    let resolution = analyzer(&config).resolve(corpus);
    let updated = baseline.update(&resolution.elements);
    let removed = baseline.len() - updated.len();

    updated.save(&path)?;

    if removed > 0 {
        eprintln!(
            "{} Removed {} invalid entries from {}",
            "OK".green().bold(),
            removed.to_string().yellow(),
            path.display()
        );
    } else {
        eprintln!("{} Baseline is up to date", "OK".green().bold());
    }
    eprintln!("   Total entries: {}", updated.len().to_string().green());

    Ok(())
}

fn run_baseline_validate(run: &RunArgs) -> Result<()> {
    let config = load_settings(run)?;
    let (path, baseline) = existing_baseline(&config)?;
    let corpus = load_corpus(&config)?;

    let resolution = analyzer(&config).resolve(corpus);
    let validation = baseline.validate(&resolution.elements);

    if validation.invalid.is_empty() {
        eprintln!(
            "{} All {} baseline entries are valid",
            "OK".green().bold(),
            validation.valid.len()
        );
        return Ok(());
    }

    eprintln!(
        "{} {} stale entries in {}:",
        "!".yellow().bold(),
        validation.invalid.len(),
        path.display()
    );
    for entry in &validation.invalid {
        eprintln!(
            "   {}:{} {} {}",
            entry.file,
            entry.line,
            entry.element_type,
            entry.element_name.red()
        );
    }
    std::process::exit(1);
}
