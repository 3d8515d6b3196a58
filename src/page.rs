/// One page-sized block of source text, destined for exactly one rendered frame.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Page {
    text: String,
    weight: usize,
}

impl Page {
    /// Create a page from its text and the number of display rows it was
    /// accounted for while paginating
    pub fn new<S: Into<String>>(text: S, weight: usize) -> Page {
        Page {
            text: text.into(),
            weight,
        }
    }

    /// The text of the page, each source line followed by a line terminator
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The estimated number of display rows the page's lines occupy
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// The source lines that make up the page
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// True if the page has nothing visible on it
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl AsRef<str> for Page {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
