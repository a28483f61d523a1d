use crate::config::Overrides;
use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "doccov",
    version,
    about = "Documentation coverage for PHP codebases",
    long_about = "Finds PHP classes, methods, properties and functions that are never \
                  mentioned in the project's markdown documentation.",
    args_conflicts_with_subcommands = true
)]
pub struct DoccovCli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl DoccovCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the baseline of accepted undocumented elements
    Baseline {
        #[command(subcommand)]
        action: BaselineCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum BaselineCommands {
    /// Record every currently undocumented element
    Generate {
        #[command(flatten)]
        run: RunArgs,

        /// Reason stored with each entry
        #[arg(long, default_value = doccov_core::DEFAULT_REASON)]
        reason: String,
    },
    /// Drop entries whose element no longer exists
    Update {
        #[command(flatten)]
        run: RunArgs,
    },
    /// List stale entries without writing (exit 1 if any)
    Validate {
        #[command(flatten)]
        run: RunArgs,
    },
}

/// Options shared by the report and the baseline commands
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Project directory to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file, relative to the project directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Source directory (repeatable)
    #[arg(short, long = "source", value_name = "DIR")]
    pub sources: Vec<String>,

    /// Documentation directory (repeatable)
    #[arg(short, long, value_name = "DIR")]
    pub docs: Vec<String>,

    /// Directory or glob to exclude (repeatable)
    #[arg(short, long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Minimum coverage percentage to pass
    #[arg(short, long = "min-coverage", value_name = "PERCENT")]
    pub min_coverage: Option<f64>,

    /// Population to measure: elements or classes
    #[arg(long, value_name = "SCOPE")]
    pub coverage_scope: Option<String>,

    /// Baseline file of accepted undocumented elements
    #[arg(short, long, value_name = "FILE")]
    pub baseline: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    /// Values to layer over the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source_paths: self.sources.clone(),
            docs_paths: self.docs.clone(),
            exclude_paths: self.exclude.clone(),
            output_format: self.format,
            output_file: self.output.clone(),
            minimum_coverage: self.min_coverage,
            coverage_scope: self.coverage_scope.clone(),
            baseline_file: self.baseline.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_flags() {
        let cli = DoccovCli::parse_from([
            "doccov", "project", "-s", "src/", "-s", "lib/", "-f", "json", "-m", "75",
        ]);
        assert!(cli.command.is_none());
        assert_eq!(cli.run.path, PathBuf::from("project"));
        assert_eq!(cli.run.sources, vec!["src/", "lib/"]);
        assert_eq!(cli.run.format, Some(OutputFormat::Json));
        assert_eq!(cli.run.min_coverage, Some(75.0));
    }

    #[test]
    fn defaults_to_current_directory() {
        let cli = DoccovCli::parse_from(["doccov"]);
        assert_eq!(cli.run.path, PathBuf::from("."));
        assert!(cli.run.overrides().minimum_coverage.is_none());
    }

    #[test]
    fn baseline_subcommand() {
        let cli = DoccovCli::parse_from([
            "doccov", "baseline", "generate", "project", "-b", "base.yml",
        ]);
        match cli.command {
            Some(Commands::Baseline {
                action: BaselineCommands::Generate { run, reason },
            }) => {
                assert_eq!(run.path, PathBuf::from("project"));
                assert_eq!(run.baseline, Some(PathBuf::from("base.yml")));
                assert_eq!(reason, doccov_core::DEFAULT_REASON);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        DoccovCli::command().debug_assert();
    }
}
