use std::path::Path;

use crate::config::LayoutConfig;
use crate::document::Document;
use crate::page::Page;
use crate::{ConvertError, Result};

/// Width of the `=` rule under each file name in a batch
const HEADER_RULE_WIDTH: usize = 40;
/// Width of each `-` run in the separator page between files
const SEPARATOR_RULE_WIDTH: usize = 20;

/// Counts how many display rows a single logical line (no terminator) will
/// occupy once it is word-wrapped to the page's text area.
pub trait LineMeasure {
    /// Always at least 1, including for an empty line
    fn wrapped_lines(&self, line: &str) -> usize;
}

impl<F> LineMeasure for F
where
    F: Fn(&str) -> usize,
{
    fn wrapped_lines(&self, line: &str) -> usize {
        self(line).max(1)
    }
}

/// The cheap planning estimate: every character is assumed to be
/// `font_size * 0.6` pixels wide, regardless of the actual font. The renderer
/// wraps with real glyph advances at word boundaries, so pages planned with
/// this estimate can come out slightly over- or under-full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharWidthEstimate {
    chars_per_line: usize,
}

impl CharWidthEstimate {
    pub fn new(config: &LayoutConfig) -> CharWidthEstimate {
        CharWidthEstimate {
            chars_per_line: config.chars_per_line(),
        }
    }

    pub fn chars_per_line(&self) -> usize {
        self.chars_per_line
    }
}

impl LineMeasure for CharWidthEstimate {
    fn wrapped_lines(&self, line: &str) -> usize {
        if line.is_empty() {
            return 1;
        }
        line.chars()
            .count()
            .div_ceil(self.chars_per_line.max(1))
            .max(1)
    }
}

/// Estimate the number of display rows `line` takes up under `config`, using
/// the character-width heuristic
pub fn estimate_wrapped_lines(line: &str, config: &LayoutConfig) -> usize {
    CharWidthEstimate::new(config).wrapped_lines(line)
}

/// One named input of a batch conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub content: String,
}

impl SourceUnit {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, content: C) -> SourceUnit {
        SourceUnit {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a text file, naming the unit after the file name without its
    /// extension. Bytes that aren't valid UTF-8 are replaced with U+FFFD.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<SourceUnit> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConvertError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        let content = decode_lossy(bytes);
        if content.contains(char::REPLACEMENT_CHARACTER) {
            log::debug!("{} is not valid UTF-8, undecodable bytes replaced", path.display());
        }
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(SourceUnit { name, content })
    }

    /// The text that gets paginated for this unit: a file banner followed by the content
    pub fn header_text(&self) -> String {
        format!(
            "File: {}\n{}\n\n{}",
            self.name,
            "=".repeat(HEADER_RULE_WIDTH),
            self.content
        )
    }
}

/// Text from raw bytes, replacing invalid UTF-8 sequences with U+FFFD
pub fn decode_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

/// The text of the page inserted between two files of a batch
pub fn separator_text() -> String {
    let rule = "-".repeat(SEPARATOR_RULE_WIDTH);
    format!("\n\n{rule} END OF FILE {rule}\n\n")
}

/// The outcome of paginating several sources: the combined document, plus the
/// sources that could not be read. A failed source never aborts the batch.
#[derive(Debug, Default)]
pub struct Batch {
    pub document: Document,
    /// How many sources made it into the document
    pub sources: usize,
    pub failures: Vec<ConvertError>,
}

/// Splits text into page-sized blocks, planning each page against a budget of
/// display rows.
///
/// # Splitting Behaviour
///
/// 1. The text is first cut at every explicit page break marker. Pages never
///    span a marker, however little text precedes it.
/// 2. Each segment is walked line by line. A line is weighed with the
///    [LineMeasure]; if adding it would push the page over
///    `lines_per_page`, the page is closed first. A page that is still empty
///    accepts any line, so a single enormous line ends up alone on its own page
///    rather than being split or looping forever.
/// 3. Pages that hold nothing but whitespace are dropped at the very end.
pub struct Paginator<'a, M = CharWidthEstimate> {
    config: &'a LayoutConfig,
    measure: M,
}

impl<'a> Paginator<'a, CharWidthEstimate> {
    /// A paginator using the character-width heuristic
    pub fn new(config: &'a LayoutConfig) -> Self {
        Paginator {
            config,
            measure: CharWidthEstimate::new(config),
        }
    }
}

impl<'a, M: LineMeasure> Paginator<'a, M> {
    /// A paginator weighing lines with a custom measure, e.g. real font metrics
    pub fn with_measure(config: &'a LayoutConfig, measure: M) -> Self {
        Paginator { config, measure }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    /// Split one text blob into pages. The result may be empty if the text has
    /// nothing visible in it.
    pub fn paginate(&self, text: &str) -> Document {
        let mut pages: Vec<Page> = Vec::new();
        for segment in text.split(self.config.page_break_marker.as_str()) {
            self.paginate_segment(segment, &mut pages);
        }

        let produced = pages.len();
        pages.retain(|page| !page.is_blank());
        log::debug!(
            "paginated {} bytes into {} pages ({} blank dropped)",
            text.len(),
            pages.len(),
            produced - pages.len()
        );

        Document::new(pages)
    }

    fn paginate_segment(&self, segment: &str, pages: &mut Vec<Page>) {
        let budget = self.config.lines_per_page;

        let mut current = String::new();
        let mut weight = 0usize;

        // `\r` and `\n` each end a line, so a CRLF pair leaves an empty line behind
        for line in segment.split(|c: char| c == '\n' || c == '\r') {
            let rows = self.measure.wrapped_lines(line).max(1);

            if weight + rows > budget && !current.is_empty() {
                pages.push(Page::new(std::mem::take(&mut current), weight));
                weight = 0;
            }

            current.push_str(line);
            current.push('\n');
            weight += rows;
        }

        if !current.is_empty() {
            pages.push(Page::new(current, weight));
        }
    }

    /// Paginate several sources into one document. Each source gets a file
    /// banner, and a separator page goes between consecutive sources. Sources
    /// that failed to load are logged, collected in [Batch::failures], and
    /// skipped; the remaining sources keep their relative order.
    pub fn paginate_many<I>(&self, sources: I) -> Batch
    where
        I: IntoIterator<Item = Result<SourceUnit>>,
    {
        let mut batch = Batch::default();

        for source in sources {
            match source {
                Ok(unit) => {
                    // separators only go between sources that were read, so a
                    // failed last file leaves no trailing separator
                    if batch.sources > 0 {
                        batch.document.add_page(self.separator_page());
                    }
                    let document = self.paginate(&unit.header_text());
                    log::debug!("source {:?} produced {} pages", unit.name, document.len());
                    batch.document.extend(document);
                    batch.sources += 1;
                }
                Err(err) => {
                    log::warn!("skipping source: {err}");
                    batch.failures.push(err);
                }
            }
        }

        batch
    }

    fn separator_page(&self) -> Page {
        let text = separator_text();
        let weight = text
            .split('\n')
            .map(|line| self.measure.wrapped_lines(line).max(1))
            .sum();
        Page::new(text, weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(lines_per_page: usize) -> LayoutConfig {
        LayoutConfig {
            lines_per_page,
            ..LayoutConfig::default()
        }
    }

    fn texts(doc: &Document) -> Vec<&str> {
        doc.iter().map(|p| p.text()).collect()
    }

    #[test]
    fn heuristic_weights() {
        let config = LayoutConfig::default();
        assert_eq!(estimate_wrapped_lines("", &config), 1);
        assert_eq!(estimate_wrapped_lines("x", &config), 1);
        assert_eq!(estimate_wrapped_lines(&"x".repeat(113), &config), 1);
        assert_eq!(estimate_wrapped_lines(&"x".repeat(114), &config), 2);
        assert_eq!(estimate_wrapped_lines(&"x".repeat(339), &config), 3);
        // characters, not bytes
        assert_eq!(estimate_wrapped_lines(&"é".repeat(113), &config), 1);
    }

    #[test]
    fn fills_pages_up_to_the_budget() {
        let config = config(3);
        let doc = Paginator::new(&config).paginate("a\nb\nc\nd");
        assert_eq!(texts(&doc), vec!["a\nb\nc\n", "d\n"]);
        assert_eq!(doc.pages[0].weight(), 3);
        assert_eq!(doc.pages[1].weight(), 1);
    }

    #[test]
    fn blank_lines_count() {
        let config = config(2);
        let doc = Paginator::new(&config).paginate("a\n\nb");
        assert_eq!(texts(&doc), vec!["a\n\n", "b\n"]);
    }

    #[test]
    fn wrapped_lines_close_the_page_early() {
        let config = config(3);
        let long = "x".repeat(config.chars_per_line() + 1);
        let text = format!("a\nb\n{long}");
        let doc = Paginator::new(&config).paginate(&text);
        assert_eq!(texts(&doc), vec!["a\nb\n".to_string(), format!("{long}\n")]);
    }

    #[test]
    fn explicit_breaks_are_never_merged() {
        let config = LayoutConfig::default();
        let doc = Paginator::new(&config).paginate("A\n--- PAGE BREAK ---\nB");
        assert_eq!(texts(&doc), vec!["A\n\n", "\nB\n"]);
    }

    #[test]
    fn custom_break_marker() {
        let config = LayoutConfig {
            page_break_marker: "<<<>>>".to_string(),
            ..LayoutConfig::default()
        };
        let doc = Paginator::new(&config).paginate("one<<<>>>two<<<>>>three");
        assert_eq!(texts(&doc), vec!["one\n", "two\n", "three\n"]);
    }

    #[test]
    fn empty_segments_vanish() {
        let config = LayoutConfig::default();
        let doc = Paginator::new(&config)
            .paginate("A--- PAGE BREAK ---\n \n--- PAGE BREAK ------ PAGE BREAK ---B");
        assert_eq!(texts(&doc), vec!["A\n", "B\n"]);
    }

    #[test]
    fn whitespace_only_input_has_no_pages() {
        let config = LayoutConfig::default();
        let paginator = Paginator::new(&config);
        assert!(paginator.paginate("").is_empty());
        assert!(paginator.paginate("  \n\t\n\r\n").is_empty());
        assert!(paginator.paginate("--- PAGE BREAK ---").is_empty());
    }

    #[test]
    fn oversized_line_gets_its_own_page() {
        let config = config(2);
        let giant = "y".repeat(config.chars_per_line() * 5);
        let text = format!("before\n{giant}\nafter");
        let doc = Paginator::new(&config).paginate(&text);
        assert_eq!(
            texts(&doc),
            vec!["before\n".to_string(), format!("{giant}\n"), "after\n".to_string()]
        );
        assert_eq!(doc.pages[1].weight(), 5);
    }

    #[test]
    fn zero_budget_still_makes_progress() {
        let config = config(0);
        let doc = Paginator::new(&config).paginate("a\nb\nc");
        assert_eq!(texts(&doc), vec!["a\n", "b\n", "c\n"]);
    }

    #[test]
    fn carriage_returns_are_line_terminators() {
        let config = LayoutConfig::default();
        let doc = Paginator::new(&config).paginate("a\r\nb\rc");
        assert_eq!(texts(&doc), vec!["a\n\nb\nc\n"]);
        assert_eq!(doc.pages[0].weight(), 4);
    }

    #[test]
    fn crlf_files_weigh_an_extra_line_per_break() {
        let config = config(3);
        let doc = Paginator::new(&config).paginate("a\r\nb\r\nc");
        assert_eq!(texts(&doc), vec!["a\n\nb\n", "\nc\n"]);
        assert_eq!(doc.pages[0].weight() + doc.pages[1].weight(), 5);
    }

    #[test]
    fn custom_measure() {
        fn doubled(_: &str) -> usize {
            2
        }

        let config = config(4);
        let doc = Paginator::with_measure(&config, doubled).paginate("a\nb\nc");
        assert_eq!(texts(&doc), vec!["a\nb\n", "c\n"]);
    }

    #[test]
    fn batch_layout() {
        let config = LayoutConfig::default();
        let paginator = Paginator::new(&config);

        let batch = paginator.paginate_many(vec![
            Ok(SourceUnit::new("first", "hello")),
            Ok(SourceUnit::new("second", "world")),
        ]);

        let banner = "=".repeat(40);
        assert_eq!(
            texts(&batch.document),
            vec![
                format!("File: first\n{banner}\n\nhello\n"),
                separator_text(),
                format!("File: second\n{banner}\n\nworld\n"),
            ]
        );
        assert_eq!(batch.sources, 2);
        assert!(batch.failures.is_empty());
    }

    #[test]
    fn reads_files_that_are_not_utf8() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cafe.txt");
        std::fs::write(&path, b"caf\xe9 au lait").expect("writes");

        let unit = SourceUnit::read(&path).expect("reads");

        assert_eq!(unit.name, "cafe");
        assert_eq!(unit.content, "caf\u{FFFD} au lait");
    }

    #[test]
    fn missing_file_is_a_read_failure() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("gone.txt");

        assert!(matches!(
            SourceUnit::read(&path),
            Err(ConvertError::SourceRead { path: p, .. }) if p == path
        ));
    }

    #[test]
    fn separator_text_format() {
        assert_eq!(
            separator_text(),
            "\n\n-------------------- END OF FILE --------------------\n\n"
        );
    }

    #[test]
    fn failed_sources_are_skipped() {
        let config = LayoutConfig::default();
        let paginator = Paginator::new(&config);

        let unreadable = || {
            Err(ConvertError::SourceRead {
                path: "gone.txt".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            })
        };

        let batch = paginator.paginate_many(vec![
            Ok(SourceUnit::new("a", "alpha")),
            unreadable(),
            Ok(SourceUnit::new("c", "gamma")),
            unreadable(),
        ]);

        assert_eq!(batch.document.len(), 3);
        assert!(batch.document.pages[0].text().contains("alpha"));
        assert_eq!(batch.document.pages[1].text(), separator_text());
        assert!(batch.document.pages[2].text().contains("gamma"));
        assert_eq!(batch.sources, 2);
        assert_eq!(batch.failures.len(), 2);
    }
}
