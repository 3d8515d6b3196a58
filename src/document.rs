use crate::{container::ContainerWriter, page::Page, render::Renderer, ConvertError, Result};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// A document is the ordered sequence of pages produced by pagination. It is
/// built once, then rendered out frame by frame with a call to [Document::render]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Document {
        Document { pages }
    }

    /// Add a page to the end of the document
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Append every page of `other`, keeping their order
    pub fn extend(&mut self, other: Document) {
        self.pages.extend(other.pages);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    /// Fails with [ConvertError::NoPagesProduced] if there is nothing to render
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.pages.is_empty() {
            Err(ConvertError::NoPagesProduced)
        } else {
            Ok(())
        }
    }

    /// Render every page with `renderer` and append it to `writer` as one
    /// frame, in document order, then finalize the container.
    ///
    /// An empty document is rejected before the renderer or the writer is
    /// touched. Returns the number of frames written.
    pub fn render<R, W>(&self, renderer: &R, writer: &mut W) -> Result<usize>
    where
        R: Renderer + ?Sized,
        W: ContainerWriter + ?Sized,
    {
        self.ensure_not_empty()?;

        let total = self.pages.len();
        for (index, page) in self.pages.iter().enumerate() {
            let frame = renderer.render_page(page.text(), index + 1, total)?;
            writer.write_frame(&frame, index + 1, total)?;
            log::debug!("wrote frame {} of {total}", index + 1);
        }
        writer.finish()?;

        Ok(total)
    }
}

impl IntoIterator for Document {
    type Item = Page;
    type IntoIter = std::vec::IntoIter<Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

impl FromIterator<Page> for Document {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        Document {
            pages: iter.into_iter().collect(),
        }
    }
}
