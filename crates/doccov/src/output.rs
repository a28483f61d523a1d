//! Output formatting for coverage reports

use doccov_core::{CodeElement, CoverageReport, DocReference, KindCoverage, group_by_file};
use eyre::{Result, eyre};
use facet::Facet;
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    #[value(alias = "text")]
    Console,
    Json,
    Html,
    #[value(alias = "md")]
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            "html" => Some(Self::Html),
            "markdown" | "md" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Json => "json",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }
}

/// Render a coverage report in the specified format
pub fn render_report(report: &CoverageReport, format: OutputFormat, minimum: f64) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(render_console(report, minimum)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Html => Ok(render_html(report, minimum)),
        OutputFormat::Markdown => Ok(render_markdown(report, minimum)),
    }
}

/// Kinds that actually occur, in reporting order
fn present_kinds(report: &CoverageReport) -> impl Iterator<Item = &KindCoverage> {
    report.by_kind.iter().filter(|k| k.total > 0)
}

fn describe(element: &CodeElement) -> String {
    format!("{} {}", element.kind, element.name)
}

fn render_console(report: &CoverageReport, minimum: f64) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Documentation Coverage Report".bold()));
    output.push_str(&format!("{}\n\n", "=".repeat(50)));

    let percent = report.coverage_percent();
    let percent_str = format!("{:.1}%", percent);
    let color_percent = if percent >= minimum {
        percent_str.green().to_string()
    } else {
        percent_str.red().to_string()
    };
    output.push_str(&format!(
        "Overall Coverage: {} ({}/{} elements)\n",
        color_percent, report.documented, report.total
    ));
    output.push_str(&format!("Minimum Required: {:.1}%\n\n", minimum));

    output.push_str("Coverage by Type:\n");
    output.push_str(&format!("{}\n", "-".repeat(30)));
    for kind in present_kinds(report) {
        output.push_str(&format!(
            "  {:<12}: {:.1}% ({}/{})\n",
            kind.kind.label(),
            kind.coverage_percent(),
            kind.documented,
            kind.total
        ));
    }
    output.push('\n');

    let classes: Vec<_> = report.undocumented_classes().collect();
    if !classes.is_empty() {
        output.push_str(&format!("{}\n", "Undocumented Classes:".yellow().bold()));
        output.push_str(&format!("{}\n", "-".repeat(30)));
        push_console_groups(&mut output, classes);
    }

    if !report.undocumented.is_empty() {
        output.push_str(&format!("{}\n", "Undocumented Elements:".yellow().bold()));
        output.push_str(&format!("{}\n", "-".repeat(30)));
        push_console_groups(&mut output, &report.undocumented);
    }

    if report.has_broken_references() {
        output.push_str(&format!(
            "{}\n",
            "Broken Documentation References:".red().bold()
        ));
        output.push_str(&format!("{}\n", "-".repeat(35)));
        for r in &report.broken_references {
            output.push_str(&format!(
                "  {}:{} - {} '{}'\n",
                r.source_file,
                r.source_line,
                r.kind,
                r.text.yellow()
            ));
        }
        output.push('\n');
    }

    if report.is_successful(minimum) {
        output.push_str(&format!("{}\n", "PASSED".green().bold()));
    } else {
        output.push_str(&format!("{}\n", "FAILED".red().bold()));
        let mut issues = vec![format!(
            "Coverage {:.1}% is below minimum {:.1}%",
            percent, minimum
        )];
        if report.has_broken_references() {
            issues.push(format!(
                "{} broken reference(s)",
                report.broken_references.len()
            ));
        }
        output.push_str(&format!("Issues: {}\n", issues.join(", ")));
    }

    output
}

fn push_console_groups<'a>(output: &mut String, elements: impl IntoIterator<Item = &'a CodeElement>) {
    for (file, elements) in group_by_file(elements) {
        output.push_str(&format!("  {}\n", file.cyan()));
        for element in elements {
            output.push_str(&format!(
                "    Line {}: {}\n",
                element.line,
                describe(element).dimmed()
            ));
        }
        output.push('\n');
    }
}

#[derive(Facet)]
struct JsonReport {
    summary: JsonSummary,
    coverage_by_type: Vec<JsonKindCoverage>,
    undocumented_classes: Vec<JsonElement>,
    undocumented_elements: Vec<JsonElement>,
    broken_references: Vec<JsonReference>,
    all_elements: Vec<JsonElement>,
    all_references: Vec<JsonReference>,
}

#[derive(Facet)]
struct JsonSummary {
    coverage_percentage: f64,
    total_elements: usize,
    documented_elements: usize,
    undocumented_elements: usize,
    undocumented_classes: usize,
    broken_references: usize,
}

#[derive(Facet)]
struct JsonKindCoverage {
    #[facet(rename = "type")]
    kind: String,
    total: usize,
    documented: usize,
    undocumented: usize,
    percentage: f64,
}

#[derive(Facet)]
struct JsonElement {
    name: String,
    #[facet(rename = "type")]
    kind: String,
    file: String,
    line: usize,
    namespace: Option<String>,
    parent_class: Option<String>,
    modifiers: Vec<String>,
    is_documented: bool,
    fully_qualified_name: String,
}

#[derive(Facet)]
struct JsonReference {
    source_file: String,
    source_line: usize,
    reference_type: String,
    referenced_element: String,
    referenced_file: Option<String>,
    referenced_line: Option<usize>,
    is_valid: bool,
}

impl From<&CodeElement> for JsonElement {
    fn from(e: &CodeElement) -> Self {
        JsonElement {
            name: e.name.clone(),
            kind: e.kind.as_str().to_string(),
            file: e.file.clone(),
            line: e.line,
            namespace: e.namespace.clone(),
            parent_class: e.enclosing_type.clone(),
            modifiers: e.modifiers.iter().map(|m| m.as_str().to_string()).collect(),
            is_documented: e.documented,
            fully_qualified_name: e.qualified_name(),
        }
    }
}

impl From<&DocReference> for JsonReference {
    fn from(r: &DocReference) -> Self {
        JsonReference {
            source_file: r.source_file.clone(),
            source_line: r.source_line,
            reference_type: r.kind.as_str().to_string(),
            referenced_element: r.text.clone(),
            referenced_file: r.resolved.as_ref().map(|l| l.file.clone()),
            referenced_line: r.resolved.as_ref().and_then(|l| l.line),
            is_valid: r.is_valid(),
        }
    }
}

fn render_json(report: &CoverageReport) -> Result<String> {
    let undocumented_classes: Vec<JsonElement> =
        report.undocumented_classes().map(Into::into).collect();

    let json_report = JsonReport {
        summary: JsonSummary {
            coverage_percentage: report.coverage_percent(),
            total_elements: report.total,
            documented_elements: report.documented,
            undocumented_elements: report.undocumented_count(),
            undocumented_classes: undocumented_classes.len(),
            broken_references: report.broken_references.len(),
        },
        coverage_by_type: report
            .by_kind
            .iter()
            .map(|k| JsonKindCoverage {
                kind: k.kind.as_str().to_string(),
                total: k.total,
                documented: k.documented,
                undocumented: k.undocumented(),
                percentage: k.coverage_percent(),
            })
            .collect(),
        undocumented_classes,
        undocumented_elements: report.undocumented.iter().map(Into::into).collect(),
        broken_references: report.broken_references.iter().map(Into::into).collect(),
        all_elements: report.elements.iter().map(Into::into).collect(),
        all_references: report.references.iter().map(Into::into).collect(),
    };

    facet_json::to_string_pretty(&json_report)
        .map_err(|e| eyre!("JSON serialization failed: {e}"))
}

fn render_markdown(report: &CoverageReport, minimum: f64) -> String {
    let mut output = String::new();

    output.push_str("# Documentation Coverage Report\n\n");

    let verdict = if report.is_successful(minimum) {
        "passed"
    } else {
        "failed"
    };
    output.push_str(&format!(
        "**Coverage:** {:.1}% ({}/{} elements, minimum {:.1}%, {})\n\n",
        report.coverage_percent(),
        report.documented,
        report.total,
        minimum,
        verdict
    ));

    output.push_str("## Coverage by Type\n\n");
    output.push_str("| Type | Coverage | Documented | Total |\n");
    output.push_str("|------|----------|------------|-------|\n");
    for kind in present_kinds(report) {
        output.push_str(&format!(
            "| {} | {:.1}% | {} | {} |\n",
            kind.kind.label(),
            kind.coverage_percent(),
            kind.documented,
            kind.total
        ));
    }
    output.push('\n');

    if !report.undocumented.is_empty() {
        output.push_str("## Undocumented Elements\n\n");
        for (file, elements) in group_by_file(&report.undocumented) {
            output.push_str(&format!("### `{}`\n\n", file));
            for element in elements {
                output.push_str(&format!(
                    "- line {}: `{}`\n",
                    element.line,
                    describe(element)
                ));
            }
            output.push('\n');
        }
    }

    if report.has_broken_references() {
        output.push_str("## Broken References\n\n");
        for r in &report.broken_references {
            output.push_str(&format!(
                "- `{}:{}` - {} `{}`\n",
                r.source_file, r.source_line, r.kind, r.text
            ));
        }
        output.push('\n');
    }

    output
}

/// Escape text for interpolation into HTML
fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const HTML_STYLE: &str = "\
body { font-family: system-ui, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }
.container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; }
h2 { border-bottom: 2px solid #eee; padding-bottom: 10px; }
.summary { text-align: center; margin-bottom: 40px; padding: 20px; background: #f9f9f9; border-radius: 6px; }
.badge { display: inline-block; font-size: 3em; font-weight: bold; padding: 20px 30px; border-radius: 50%; color: white; }
.badge.success { background: #4caf50; }
.badge.error { background: #f44336; }
table { width: 100%; border-collapse: collapse; margin-bottom: 30px; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
tr.good { background: #e8f5e8; }
tr.warn { background: #fff3cd; }
tr.bad { background: #f8d7da; }
.file { margin-bottom: 20px; padding: 15px; background: #f9f9f9; border-radius: 4px; }
code { background: #f0f0f0; padding: 0.2em 0.4em; border-radius: 3px; }
";

fn render_html(report: &CoverageReport, minimum: f64) -> String {
    let mut output = String::new();

    output.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    output.push_str("<meta charset=\"utf-8\">\n");
    output.push_str("<title>Documentation Coverage Report</title>\n");
    output.push_str(&format!("<style>\n{HTML_STYLE}</style>\n"));
    output.push_str("</head>\n<body>\n<div class=\"container\">\n");
    output.push_str("<h1>Documentation Coverage Report</h1>\n");

    let percent = report.coverage_percent();
    let badge = if report.is_successful(minimum) {
        "success"
    } else {
        "error"
    };
    output.push_str("<div class=\"summary\">\n");
    output.push_str(&format!(
        "<div class=\"badge {}\">{:.1}%</div>\n",
        badge, percent
    ));
    output.push_str(&format!(
        "<p>{} out of {} elements documented</p>\n",
        report.documented, report.total
    ));
    output.push_str(&format!("<p>Minimum required: {:.1}%</p>\n", minimum));
    output.push_str("</div>\n");

    output.push_str("<h2>Coverage by Type</h2>\n<table>\n");
    output.push_str("<tr><th>Type</th><th>Coverage</th><th>Documented</th><th>Total</th></tr>\n");
    for kind in present_kinds(report) {
        let kind_percent = kind.coverage_percent();
        let class = if kind_percent >= 80.0 {
            "good"
        } else if kind_percent >= 50.0 {
            "warn"
        } else {
            "bad"
        };
        output.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{:.1}%</td><td>{}</td><td>{}</td></tr>\n",
            class,
            kind.kind.label(),
            kind_percent,
            kind.documented,
            kind.total
        ));
    }
    output.push_str("</table>\n");

    let classes: Vec<_> = report.undocumented_classes().collect();
    if !classes.is_empty() {
        output.push_str("<h2>Undocumented Classes</h2>\n");
        push_html_groups(&mut output, classes);
    }

    if !report.undocumented.is_empty() {
        output.push_str("<h2>Undocumented Elements</h2>\n");
        push_html_groups(&mut output, &report.undocumented);
    }

    if report.has_broken_references() {
        output.push_str("<h2>Broken References</h2>\n<ul>\n");
        for r in &report.broken_references {
            output.push_str(&format!(
                "<li><code>{}:{}</code> - {} <code>{}</code></li>\n",
                escape_html(&r.source_file),
                r.source_line,
                r.kind,
                escape_html(&r.text)
            ));
        }
        output.push_str("</ul>\n");
    }

    output.push_str("</div>\n</body>\n</html>\n");
    output
}

fn push_html_groups<'a>(output: &mut String, elements: impl IntoIterator<Item = &'a CodeElement>) {
    for (file, elements) in group_by_file(elements) {
        output.push_str("<div class=\"file\">\n");
        output.push_str(&format!("<h3>{}</h3>\n<ul>\n", escape_html(file)));
        for element in elements {
            output.push_str(&format!(
                "<li>Line {}: <code>{}</code></li>\n",
                element.line,
                escape_html(&describe(element))
            ));
        }
        output.push_str("</ul>\n</div>\n");
    }
}
