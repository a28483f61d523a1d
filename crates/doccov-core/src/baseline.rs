//! Baseline: a persisted exemption list of accepted undocumented elements
//!
//! Entries are keyed by the identity hash of `(file, line, kind, name)`, so
//! moving, renaming or deleting an element makes its entry stale.

use crate::element::{CodeElement, ElementKind, Identity};
use eyre::{Result, WrapErr, eyre};
use facet::Facet;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Format version written to baseline files
pub const BASELINE_VERSION: &str = "1.0";

/// Reason recorded by `baseline generate`
pub const DEFAULT_REASON: &str = "Legacy code - documentation needed";

/// One exempted element
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct BaselineEntry {
    pub file: String,
    pub line: usize,
    pub element_type: ElementKind,
    pub element_name: String,
    /// Free text; omitted from the file when empty
    pub reason: String,
    /// Identity hash as stored (recomputed when the file has none)
    pub hash: String,
}

impl BaselineEntry {
    pub fn from_element(element: &CodeElement, reason: impl Into<String>) -> Self {
        Self {
            file: element.file.clone(),
            line: element.line,
            element_type: element.kind,
            element_name: element.name.clone(),
            reason: reason.into(),
            hash: element.identity().hash(),
        }
    }

    pub fn identity(&self) -> Identity<'_> {
        Identity {
            file: &self.file,
            line: self.line,
            kind: self.element_type,
            name: &self.element_name,
        }
    }
}

/// Baseline entries split by whether their element still exists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineValidation {
    pub valid: Vec<BaselineEntry>,
    pub invalid: Vec<BaselineEntry>,
}

/// An ordered set of baseline entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    pub entries: Vec<BaselineEntry>,
}

impl Baseline {
    pub fn new(entries: Vec<BaselineEntry>) -> Self {
        Self { entries }
    }

    /// Exempt every undocumented element, sorted by `(file, line)`
    pub fn generate(elements: &[CodeElement], reason: &str) -> Self {
        let mut entries: Vec<_> = elements
            .iter()
            .filter(|e| !e.documented)
            .map(|e| BaselineEntry::from_element(e, reason))
            .collect();
        entries.sort_by(|a, b| (&a.file, a.line).cmp(&(&b.file, b.line)));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn identity_keys(&self) -> HashSet<String> {
        self.entries.iter().map(|e| e.identity().hash()).collect()
    }

    /// Drop elements that are listed here and still undocumented
    ///
    /// A documented element is always kept, listed or not.
    pub fn filter(&self, elements: Vec<CodeElement>) -> Vec<CodeElement> {
        if self.entries.is_empty() {
            return elements;
        }
        let keys = self.identity_keys();
        elements
            .into_iter()
            .filter(|e| e.documented || !keys.contains(&e.identity().hash()))
            .collect()
    }

    /// Split entries by whether their identity still matches a current element
    pub fn validate(&self, elements: &[CodeElement]) -> BaselineValidation {
        let current: HashSet<String> = elements.iter().map(|e| e.identity().hash()).collect();
        let (valid, invalid) = self
            .entries
            .iter()
            .cloned()
            .partition(|entry| current.contains(&entry.identity().hash()));
        BaselineValidation { valid, invalid }
    }

    /// Keep only entries whose element still exists
    pub fn update(&self, elements: &[CodeElement]) -> Baseline {
        Baseline::new(self.validate(elements).valid)
    }

    /// Load a baseline file
    ///
    /// A missing or unparsable file is an empty baseline. Each entry is parsed
    /// on its own: one that is malformed, misses a required field or names an
    /// unknown element type is skipped and the rest still load.
    pub fn load(path: &Path) -> Baseline {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if path.exists() {
                    warn!("Failed to read baseline {}: {e}", path.display());
                } else {
                    debug!("no baseline at {}", path.display());
                }
                return Baseline::default();
            }
        };

        let (header, entries) = split_document(&content);

        let header = if is_blank(header) {
            BaselineHeader::default()
        } else {
            facet_yaml::from_str::<BaselineHeader>(header).unwrap_or_else(|e| {
                warn!("Ignoring malformed baseline header in {}: {e}", path.display());
                BaselineHeader::default()
            })
        };

        let entries: Vec<_> = match entries {
            EntriesSection::Block(items) => items
                .iter()
                .filter_map(|item| match facet_yaml::from_str::<RawEntry>(item) {
                    Ok(raw) => raw.into_entry(),
                    Err(e) => {
                        warn!("Skipping malformed baseline entry in {}: {e}", path.display());
                        None
                    }
                })
                .collect(),
            EntriesSection::Flow(flow) => {
                match facet_yaml::from_str::<FlowEntries>(&format!("entries: {flow}")) {
                    Ok(file) => file
                        .entries
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(RawEntry::into_entry)
                        .collect(),
                    Err(e) => {
                        warn!("Ignoring malformed baseline {}: {e}", path.display());
                        Vec::new()
                    }
                }
            }
            EntriesSection::Missing => Vec::new(),
        };
        debug!(
            version = ?header.version,
            generated_at = ?header.generated_at,
            declared = ?header.total_entries,
            loaded = entries.len(),
            "loaded baseline {}",
            path.display()
        );
        Baseline { entries }
    }

    /// Write the baseline with a generation timestamp of now
    pub fn save(&self, path: &Path) -> Result<()> {
        let generated_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| eyre!("Failed to format timestamp: {e}"))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_yaml(&generated_at))
            .wrap_err_with(|| format!("Failed to write baseline: {}", path.display()))
    }

    /// Render the commented YAML document, entries sorted by `(file, line)`
    pub fn to_yaml(&self, generated_at: &str) -> String {
        use std::fmt::Write;

        let mut entries: Vec<&BaselineEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| (&a.file, a.line).cmp(&(&b.file, b.line)));

        let mut per_file: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in &entries {
            *per_file.entry(entry.file.as_str()).or_default() += 1;
        }

        let mut out = String::new();
        let _ = writeln!(out, "# doccov baseline");
        let _ = writeln!(
            out,
            "# Elements listed here are exempt from documentation coverage checks"
        );
        let _ = writeln!(out, "# Generated on: {generated_at}");
        let _ = writeln!(out, "# Total entries: {}", entries.len());
        out.push('\n');

        let _ = writeln!(out, "version: {}", quote(BASELINE_VERSION));
        let _ = writeln!(out, "generated_at: {}", quote(generated_at));
        let _ = writeln!(out, "total_entries: {}", entries.len());
        out.push('\n');

        if !per_file.is_empty() {
            let _ = writeln!(out, "# Files overview:");
            for (file, count) in &per_file {
                let _ = writeln!(out, "# - {file} ({count} entries)");
            }
            out.push('\n');
        }

        if entries.is_empty() {
            let _ = writeln!(out, "entries: []");
            return out;
        }

        let _ = writeln!(out, "entries:");
        for entry in entries {
            let _ = writeln!(out, "  - file: {}", quote(&entry.file));
            let _ = writeln!(out, "    line: {}", entry.line);
            let _ = writeln!(out, "    element_type: {}", quote(entry.element_type.as_str()));
            let _ = writeln!(out, "    element_name: {}", quote(&entry.element_name));
            if !entry.reason.is_empty() {
                let _ = writeln!(out, "    reason: {}", quote(&entry.reason));
            }
            let _ = writeln!(out, "    hash: {}", quote(&entry.hash));
            out.push('\n');
        }
        out
    }
}

/// Single-quoted YAML scalar
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Top-level keys before `entries:`; every field optional
#[derive(Debug, Default, Facet)]
struct BaselineHeader {
    #[facet(default)]
    version: Option<String>,
    #[facet(default)]
    generated_at: Option<String>,
    #[facet(default)]
    total_entries: Option<usize>,
}

/// `entries: [...]` written on one line
#[derive(Debug, Default, Facet)]
struct FlowEntries {
    #[facet(default)]
    entries: Option<Vec<RawEntry>>,
}

enum EntriesSection {
    Missing,
    /// Inline sequence text after `entries:`
    Flow(String),
    /// One standalone YAML document per sequence item
    Block(Vec<String>),
}

/// Only whitespace and comments
fn is_blank(yaml: &str) -> bool {
    yaml.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    })
}

/// Split a baseline file into its header text and its entries
///
/// Block-sequence items under a top-level `entries:` key are cut out one by
/// one and dedented, so a malformed item only loses itself.
fn split_document(content: &str) -> (&str, EntriesSection) {
    let mut offset = 0;
    let mut rest = None;
    for line in content.split_inclusive('\n') {
        if let Some(value) = line.strip_prefix("entries:") {
            rest = Some((offset, value.trim(), &content[offset + line.len()..]));
            break;
        }
        offset += line.len();
    }
    let Some((header_end, inline, body)) = rest else {
        return (content, EntriesSection::Missing);
    };
    let header = &content[..header_end];

    if !inline.is_empty() && !inline.starts_with('#') {
        return (header, EntriesSection::Flow(inline.to_string()));
    }

    let mut items: Vec<String> = Vec::new();
    let mut item_indent = None;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - trimmed.len();
        let is_item = trimmed == "-" || trimmed.starts_with("- ");
        let base = *item_indent.get_or_insert(indent);

        if is_item && indent == base {
            items.push(format!("{}{}\n", " ".repeat(base + 1), &trimmed[1..]));
        } else if let Some(item) = items.last_mut().filter(|_| indent > base) {
            item.push_str(line);
            item.push('\n');
        } else {
            break;
        }
    }

    // Drop the sequence indentation so each item parses as a mapping
    let items = items
        .into_iter()
        .map(|item| {
            let strip = item_indent.unwrap_or(0) + 2;
            item.lines()
                .map(|l| {
                    let leading = l.len() - l.trim_start().len();
                    &l[leading.min(strip)..]
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();

    (header, EntriesSection::Block(items))
}

#[derive(Debug, Default, Facet)]
struct RawEntry {
    #[facet(default)]
    file: Option<String>,
    #[facet(default)]
    line: Option<usize>,
    #[facet(default)]
    element_type: Option<String>,
    #[facet(default)]
    element_name: Option<String>,
    #[facet(default)]
    reason: Option<String>,
    #[facet(default)]
    hash: Option<String>,
}

impl RawEntry {
    fn into_entry(self) -> Option<BaselineEntry> {
        let (Some(file), Some(line), Some(element_type), Some(element_name)) =
            (self.file, self.line, self.element_type, self.element_name)
        else {
            debug!("skipping incomplete baseline entry");
            return None;
        };
        let Some(element_type) = ElementKind::parse(&element_type) else {
            debug!("skipping baseline entry with unknown type `{element_type}`");
            return None;
        };

        let mut entry = BaselineEntry {
            file,
            line,
            element_type,
            element_name,
            reason: self.reason.unwrap_or_default(),
            hash: String::new(),
        };
        entry.hash = match self.hash {
            Some(hash) if !hash.is_empty() => hash,
            _ => entry.identity().hash(),
        };
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements() -> Vec<CodeElement> {
        vec![
            CodeElement::new("render", ElementKind::Method, "src/Widget.php", 12).in_type("Widget"),
            CodeElement::new("Widget", ElementKind::Class, "src/Widget.php", 3),
            CodeElement::new("Gadget", ElementKind::Class, "src/Gadget.php", 7),
        ]
    }

    #[test]
    fn generate_lists_undocumented_sorted() {
        let mut elements = elements();
        elements[1].mark_documented();

        let baseline = Baseline::generate(&elements, DEFAULT_REASON);

        let listed: Vec<_> = baseline
            .entries
            .iter()
            .map(|e| (e.file.as_str(), e.line))
            .collect();
        assert_eq!(listed, vec![("src/Gadget.php", 7), ("src/Widget.php", 12)]);
        assert_eq!(baseline.entries[0].reason, DEFAULT_REASON);
        assert_eq!(baseline.entries[0].hash, elements[2].identity().hash());
    }

    #[test]
    fn filter_only_hides_still_undocumented() {
        let mut current = elements();
        let baseline = Baseline::generate(&current, DEFAULT_REASON);

        let filtered = baseline.filter(current.clone());
        assert!(filtered.is_empty());

        current[0].mark_documented();
        let filtered = baseline.filter(current);
        let names: Vec<_> = filtered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["render"]);
    }

    #[test]
    fn update_prunes_deleted_elements() {
        let original = elements();
        let baseline = Baseline::generate(&original, DEFAULT_REASON);
        assert_eq!(baseline.len(), 3);

        let remaining = vec![original[0].clone(), original[2].clone()];
        let validation = baseline.validate(&remaining);
        assert_eq!(validation.valid.len(), 2);
        assert_eq!(validation.invalid.len(), 1);
        assert_eq!(validation.invalid[0].element_name, "Widget");

        let updated = baseline.update(&remaining);
        assert_eq!(baseline.len() - updated.len(), 1);
    }

    #[test]
    fn moved_element_makes_entry_stale() {
        let original = elements();
        let baseline = Baseline::generate(&original, DEFAULT_REASON);
        let mut moved = original.clone();
        moved[2].line += 1;
        let validation = baseline.validate(&moved);
        assert_eq!(validation.invalid.len(), 1);
        assert_eq!(validation.invalid[0].element_name, "Gadget");
    }

    #[test]
    fn save_and_load_preserve_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("baseline/doccov-baseline.yml");
        let mut elements = elements();
        elements.push(CodeElement::new("it's", ElementKind::Function, "src/odd.php", 1));
        let baseline = Baseline::generate(&elements, "Owner's call");

        baseline.save(&path).unwrap();
        let loaded = Baseline::load(&path);

        assert_eq!(loaded, baseline);
    }

    #[test]
    fn yaml_layout() {
        let baseline = Baseline::generate(&elements()[2..], "");
        let yaml = baseline.to_yaml("2026-01-01T00:00:00Z");

        assert!(yaml.contains("version: '1.0'\n"));
        assert!(yaml.contains("generated_at: '2026-01-01T00:00:00Z'\n"));
        assert!(yaml.contains("total_entries: 1\n"));
        assert!(yaml.contains("# - src/Gadget.php (1 entries)\n"));
        assert!(yaml.contains("  - file: 'src/Gadget.php'\n    line: 7\n    element_type: 'class'\n"));
        assert!(!yaml.contains("reason:"));
    }

    #[test]
    fn missing_or_malformed_files_are_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Baseline::load(&tmp.path().join("absent.yml")).is_empty());

        let bad = tmp.path().join("bad.yml");
        std::fs::write(&bad, "entries: [unclosed").unwrap();
        assert!(Baseline::load(&bad).is_empty());
    }

    #[test]
    fn incomplete_entries_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("baseline.yml");
        std::fs::write(
            &path,
            "version: '1.0'\n\
             entries:\n  \
               - file: 'src/A.php'\n    line: 3\n    element_type: 'class'\n    element_name: 'A'\n  \
               - file: 'src/B.php'\n    element_type: 'class'\n    element_name: 'B'\n  \
               - file: 'src/C.php'\n    line: 1\n    element_type: 'enum'\n    element_name: 'C'\n",
        )
        .unwrap();

        let loaded = Baseline::load(&path);

        assert_eq!(loaded.len(), 1);
        let entry = &loaded.entries[0];
        assert_eq!(entry.element_name, "A");
        assert_eq!(entry.hash, entry.identity().hash());
    }

    #[test]
    fn malformed_entry_does_not_discard_the_rest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("baseline.yml");
        std::fs::write(
            &path,
            "version: '1.0'\n\
             total_entries: 5\n\
             entries:\n  \
               - file: 'a.php'\n    line: 1\n    element_type: 'class'\n    element_name: 'A'\n  \
               - file: 'b.php'\n    line: abc\n    element_type: 'class'\n    element_name: 'B'\n  \
               - file: 'c.php'\n    line: -3\n    element_type: 'class'\n    element_name: 'C'\n  \
               - oops\n  \
               - file: 'd.php'\n    line: 4\n    element_type: 'function'\n    element_name: 'd'\n",
        )
        .unwrap();

        let loaded = Baseline::load(&path);

        let names: Vec<_> = loaded.entries.iter().map(|e| e.element_name.as_str()).collect();
        assert_eq!(names, vec!["A", "d"]);
        assert_eq!(loaded.entries[1].line, 4);
    }

    #[test]
    fn empty_entries_list_loads() {
        let yaml = Baseline::default().to_yaml("2026-01-01T00:00:00Z");
        assert!(yaml.contains("entries: []"));

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("baseline.yml");
        std::fs::write(&path, yaml).unwrap();
        assert!(Baseline::load(&path).is_empty());
    }
}
