//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};

use crate::parser::xml::{Element, Node};

/// A paragraph of text content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Attributes of the paragraph element (revision ids and the like)
    pub attributes: Vec<(String, String)>,

    /// Paragraph properties (`w:pPr`), kept verbatim
    pub properties: Option<Element>,

    /// Runs and other inline content
    pub content: Vec<InlineContent>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single unformatted run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph from a list of runs.
    pub fn with_runs(runs: impl IntoIterator<Item = TextRun>) -> Self {
        let mut p = Self::new();
        for run in runs {
            p.add_run(run);
        }
        p
    }

    /// Add an unformatted run.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.add_run(TextRun::new(text));
    }

    /// Add a run.
    pub fn add_run(&mut self, run: TextRun) {
        self.content.push(InlineContent::Run(run));
    }

    /// Iterate over the paragraph's runs, including runs inside hyperlinks,
    /// tracked insertions and smart tags.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        let mut runs = Vec::new();
        collect_runs(&self.content, &mut runs);
        runs.into_iter()
    }

    /// Iterate mutably over the paragraph's runs in document order.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut TextRun> {
        let mut runs = Vec::new();
        collect_runs_mut(&mut self.content, &mut runs);
        runs.into_iter()
    }

    /// Get the visible text of the paragraph (concatenation of its runs).
    pub fn plain_text(&self) -> String {
        self.runs().map(|r| r.text()).collect()
    }

    /// Replace the paragraph's text with a single run.
    ///
    /// All runs collapse into one that keeps the first run's formatting and
    /// takes the first run's place, inside its wrapper if it had one.
    /// Inline content that is not a run stays where it was.
    pub fn set_text(&mut self, text: &str) {
        let path = first_run_path(&self.content).unwrap_or_default();
        let mut run = TextRun::new(text);
        if let Some(first) = self.runs().next() {
            run.properties = first.properties.clone();
            run.attributes = first.attributes.clone();
        }

        strip_runs(&mut self.content);
        insert_at_path(&mut self.content, &path, InlineContent::Run(run));
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }
}

fn collect_runs<'a>(content: &'a [InlineContent], out: &mut Vec<&'a TextRun>) {
    for item in content {
        match item {
            InlineContent::Run(run) => out.push(run),
            InlineContent::Group(group) => collect_runs(&group.content, out),
            InlineContent::Other(_) => {}
        }
    }
}

fn collect_runs_mut<'a>(content: &'a mut [InlineContent], out: &mut Vec<&'a mut TextRun>) {
    for item in content {
        match item {
            InlineContent::Run(run) => out.push(run),
            InlineContent::Group(group) => collect_runs_mut(&mut group.content, out),
            InlineContent::Other(_) => {}
        }
    }
}

/// Index path from the paragraph down to its first run.
fn first_run_path(content: &[InlineContent]) -> Option<Vec<usize>> {
    for (i, item) in content.iter().enumerate() {
        match item {
            InlineContent::Run(_) => return Some(vec![i]),
            InlineContent::Group(group) => {
                if let Some(mut path) = first_run_path(&group.content) {
                    path.insert(0, i);
                    return Some(path);
                }
            }
            InlineContent::Other(_) => {}
        }
    }
    None
}

fn strip_runs(content: &mut Vec<InlineContent>) {
    content.retain(|c| !matches!(c, InlineContent::Run(_)));
    for item in content.iter_mut() {
        if let InlineContent::Group(group) = item {
            strip_runs(&mut group.content);
        }
    }
}

// Only runs are stripped and none precede the first one, so the path
// recorded before stripping still points at the same slot.
fn insert_at_path(content: &mut Vec<InlineContent>, path: &[usize], item: InlineContent) {
    match path {
        [] => content.push(item),
        [at] => {
            let at = (*at).min(content.len());
            content.insert(at, item);
        }
        [index, rest @ ..] => match content.get_mut(*index) {
            Some(InlineContent::Group(group)) => insert_at_path(&mut group.content, rest, item),
            _ => content.push(item),
        },
    }
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineContent {
    /// A formatted text run
    Run(TextRun),

    /// A wrapper around runs (`w:hyperlink`, `w:ins`, `w:smartTag`)
    Group(RunGroup),

    /// Anything else (bookmarks, proofing marks, deletions), kept verbatim
    Other(Node),
}

/// An inline element whose runs are part of the paragraph's visible text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunGroup {
    /// Element name, e.g. `w:hyperlink`
    pub name: String,

    /// Attributes of the wrapper (relationship id, revision author)
    pub attributes: Vec<(String, String)>,

    /// Wrapped content
    pub content: Vec<InlineContent>,
}

impl RunGroup {
    /// Create an empty wrapper element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Add a run to the wrapper.
    pub fn with_run(mut self, run: TextRun) -> Self {
        self.content.push(InlineContent::Run(run));
        self
    }
}

/// A run of text sharing one set of formatting properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Attributes of the run element
    pub attributes: Vec<(String, String)>,

    /// Run properties (`w:rPr`); opaque to the filler
    pub properties: Option<Element>,

    /// Run content in document order
    pub content: Vec<RunContent>,
}

impl TextRun {
    /// Create a new run with no formatting.
    pub fn new(text: impl Into<String>) -> Self {
        let mut run = Self::default();
        run.set_text(&text.into());
        run
    }

    /// Create a run with the given properties element.
    pub fn styled(text: impl Into<String>, properties: Element) -> Self {
        let mut run = Self::new(text);
        run.properties = Some(properties);
        run
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(text, Element::new("w:rPr").with_child(Element::new("w:b")))
    }

    /// Get the run's text. Tabs read as `\t`, line breaks as `\n`.
    pub fn text(&self) -> String {
        segment_text(&self.content)
    }

    /// Replace the run's content with text, keeping its properties.
    pub fn set_text(&mut self, text: &str) {
        self.content = text_content(text);
    }

    /// Replace every occurrence of `key` in the run, returning how many were
    /// replaced.
    ///
    /// Text between two pieces of non-text content (page breaks, fields,
    /// drawings) is searched on its own, so those pieces keep their place.
    /// An occurrence that straddles one of them is not replaced.
    pub fn replace_text(&mut self, key: &str, value: &str) -> usize {
        if key.is_empty() {
            return 0;
        }

        let mut replaced = 0;
        let mut content = Vec::with_capacity(self.content.len());
        let mut segment = Vec::new();
        for item in std::mem::take(&mut self.content) {
            if let RunContent::Other(_) = item {
                let done = std::mem::take(&mut segment);
                replaced += replace_in_segment(done, key, value, &mut content);
                content.push(item);
            } else {
                segment.push(item);
            }
        }
        replaced += replace_in_segment(segment, key, value, &mut content);

        self.content = content;
        replaced
    }

    /// Check if this run has no text.
    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}

fn segment_text(content: &[RunContent]) -> String {
    let mut out = String::new();
    for c in content {
        match c {
            RunContent::Text(t) => out.push_str(t),
            RunContent::Tab => out.push('\t'),
            RunContent::Break => out.push('\n'),
            RunContent::Other(_) => {}
        }
    }
    out
}

fn replace_in_segment(
    segment: Vec<RunContent>,
    key: &str,
    value: &str,
    out: &mut Vec<RunContent>,
) -> usize {
    let text = segment_text(&segment);
    let count = text.matches(key).count();
    if count == 0 {
        out.extend(segment);
    } else {
        out.extend(text_content(&text.replace(key, value)));
    }
    count
}

/// Split text into run content: `\t` becomes a tab, `\n` a break, `\r` is dropped.
fn text_content(text: &str) -> Vec<RunContent> {
    let mut content = Vec::new();
    let mut buf = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => {
                if !buf.is_empty() {
                    content.push(RunContent::Text(std::mem::take(&mut buf)));
                }
                content.push(if ch == '\t' {
                    RunContent::Tab
                } else {
                    RunContent::Break
                });
            }
            '\r' => {}
            _ => buf.push(ch),
        }
    }
    if !buf.is_empty() {
        content.push(RunContent::Text(buf));
    }
    content
}

/// Content of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RunContent {
    /// Literal text (`w:t`)
    Text(String),

    /// A tab character (`w:tab`)
    Tab,

    /// A plain line break (`w:br` without a type, or `w:cr`)
    Break,

    /// Anything else, kept verbatim
    Other(Node),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new();
        p.add_text("Hello ");
        p.add_run(TextRun::bold("world"));
        p.add_text("!");

        assert_eq!(p.plain_text(), "Hello world!");
    }

    #[test]
    fn test_run_text_with_tabs_and_breaks() {
        let run = TextRun::new("a\tb\nc");
        assert_eq!(
            run.content,
            vec![
                RunContent::Text("a".into()),
                RunContent::Tab,
                RunContent::Text("b".into()),
                RunContent::Break,
                RunContent::Text("c".into()),
            ]
        );
        assert_eq!(run.text(), "a\tb\nc");
    }

    #[test]
    fn test_set_text_keeps_properties() {
        let mut run = TextRun::bold("old");
        run.set_text("new");
        assert_eq!(run.text(), "new");
        assert_eq!(run.properties, TextRun::bold("").properties);
    }

    #[test]
    fn test_paragraph_set_text_uses_first_run_formatting() {
        let mut p = Paragraph::with_runs([TextRun::bold("{{NA"), TextRun::new("ME}}")]);
        p.content
            .push(InlineContent::Other(Node::Element(Element::new("w:bookmarkEnd"))));

        p.set_text("Maria");

        assert_eq!(p.plain_text(), "Maria");
        assert_eq!(p.runs().count(), 1);
        assert_eq!(p.runs().next().unwrap().properties, TextRun::bold("").properties);
        assert!(matches!(p.content.last(), Some(InlineContent::Other(_))));
    }

    #[test]
    fn test_replace_text_keeps_page_break_in_place() {
        let page_break = Node::Element(Element::new("w:br").with_attribute("w:type", "page"));
        let mut run = TextRun {
            content: vec![
                RunContent::Text("Nome {{NOME}}".into()),
                RunContent::Other(page_break.clone()),
                RunContent::Text("Pagina 2".into()),
            ],
            ..TextRun::default()
        };

        assert_eq!(run.replace_text("{{NOME}}", "Ana"), 1);
        assert_eq!(
            run.content,
            vec![
                RunContent::Text("Nome Ana".into()),
                RunContent::Other(page_break),
                RunContent::Text("Pagina 2".into()),
            ]
        );
    }

    #[test]
    fn test_replace_text_skips_key_across_other_content() {
        let mut run = TextRun {
            content: vec![
                RunContent::Text("{{NO".into()),
                RunContent::Other(Node::Element(Element::new("w:fldChar"))),
                RunContent::Text("ME}}".into()),
            ],
            ..TextRun::default()
        };
        let before = run.clone();

        assert_eq!(run.replace_text("{{NOME}}", "Ana"), 0);
        assert_eq!(run, before);
        assert_eq!(TextRun::new("x").replace_text("", "y"), 0);
    }

    #[test]
    fn test_runs_inside_hyperlink_are_visible() {
        let mut p = Paragraph::with_text("Site: ");
        p.content.push(InlineContent::Group(
            RunGroup::new("w:hyperlink").with_run(TextRun::new("{{SITE}}")),
        ));

        assert_eq!(p.plain_text(), "Site: {{SITE}}");
        assert_eq!(p.runs().count(), 2);
        for run in p.runs_mut() {
            run.replace_text("{{SITE}}", "clinica.com");
        }
        assert_eq!(p.plain_text(), "Site: clinica.com");
        assert!(matches!(p.content[1], InlineContent::Group(_)));
    }

    #[test]
    fn test_set_text_inside_group_keeps_wrapper() {
        let mut p = Paragraph::new();
        p.content.push(InlineContent::Other(Node::Element(Element::new("w:bookmarkStart"))));
        p.content.push(InlineContent::Group(
            RunGroup::new("w:ins")
                .with_run(TextRun::bold("{{NO"))
                .with_run(TextRun::new("ME}}")),
        ));
        p.add_text(" fim");

        p.set_text("Ana fim");

        assert_eq!(p.plain_text(), "Ana fim");
        assert_eq!(p.content.len(), 2);
        match &p.content[1] {
            InlineContent::Group(group) => {
                assert_eq!(group.name, "w:ins");
                assert_eq!(group.content.len(), 1);
            }
            other => panic!("expected the w:ins wrapper, got {:?}", other),
        }
        assert_eq!(p.runs().next().unwrap().properties, TextRun::bold("").properties);
    }

    #[test]
    fn test_empty_paragraph() {
        assert!(Paragraph::new().is_empty());
        assert!(Paragraph::with_text("   ").is_empty());
        assert!(!Paragraph::with_text("x").is_empty());
    }
}
