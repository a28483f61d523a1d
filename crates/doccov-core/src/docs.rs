//! Line-oriented documentation scanning

/// File extensions treated as documentation
pub const DOC_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Marker that opens and closes a fenced code block
const FENCE: &str = "```";

/// A documentation file split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path of the file, as it should appear in reports
    pub path: String,
    /// Raw lines, split on `\n`
    pub lines: Vec<String>,
}

/// Where a line sits relative to fenced code blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Ordinary documentation text
    Prose,
    /// A fence marker line (opens or closes a block)
    Fence,
    /// A line inside a fenced block
    Code,
}

/// One line yielded by [`Document::scan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedLine<'a> {
    /// Line number (1-indexed)
    pub number: usize,
    /// Index into [`Document::lines`]
    pub index: usize,
    pub text: &'a str,
    pub state: LineState,
}

impl Document {
    pub fn new(path: impl Into<String>, content: &str) -> Self {
        Self {
            path: path.into(),
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    /// Walk the lines while tracking fenced-code-block state
    pub fn scan(&self) -> impl Iterator<Item = ScannedLine<'_>> {
        let mut in_block = false;
        self.lines.iter().enumerate().map(move |(index, text)| {
            let state = if text.starts_with(FENCE) {
                in_block = !in_block;
                LineState::Fence
            } else if in_block {
                LineState::Code
            } else {
                LineState::Prose
            };
            ScannedLine {
                number: index + 1,
                index,
                text,
                state,
            }
        })
    }
}

/// Whether a path has a documentation extension
pub fn is_doc_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DOC_EXTENSIONS.contains(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_state_toggles_on_marker_lines() {
        let doc = Document::new(
            "docs/guide.md",
            "intro\n```php\n$x->run();\n```\noutro",
        );
        let states: Vec<_> = doc.scan().map(|l| (l.number, l.state)).collect();
        assert_eq!(
            states,
            vec![
                (1, LineState::Prose),
                (2, LineState::Fence),
                (3, LineState::Code),
                (4, LineState::Fence),
                (5, LineState::Prose),
            ]
        );
    }

    #[test]
    fn indented_backticks_are_not_fences() {
        let doc = Document::new("a.md", "  ```\ntext");
        assert!(doc.scan().all(|l| l.state == LineState::Prose));
    }

    #[test]
    fn unterminated_block_runs_to_end_of_file() {
        let doc = Document::new("a.md", "```\none\ntwo");
        let last = doc.scan().last().unwrap();
        assert_eq!(last.state, LineState::Code);
    }

    #[test]
    fn doc_extensions() {
        use std::path::Path;
        assert!(is_doc_file(Path::new("docs/index.md")));
        assert!(is_doc_file(Path::new("README.markdown")));
        assert!(!is_doc_file(Path::new("src/Foo.php")));
    }
}
