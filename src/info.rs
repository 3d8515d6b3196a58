use chrono::{DateTime, Local};
use std::io::{Seek, Write};
use tiff::encoder::{DirectoryEncoder, TiffKindStandard};
use tiff::tags::Tag;
use tiff::TiffResult;

/// TIFF `PageNumber` tag
const PAGE_NUMBER_TAG: u16 = 297;

/// General document metadata such as title, author, etc, written into every
/// frame of the container
#[derive(Default, Debug, Clone)]
pub struct Info {
    /// Written as the `ImageDescription` of each frame
    pub title: Option<String>,
    /// Written as the `Artist` of each frame. No prescribed format.
    pub author: Option<String>,
    /// When the document was created; defaults to when it gets written
    pub created: Option<DateTime<Local>>,
}

impl Info {
    /// Create a new info block, with all metadata set to [None]
    pub fn new() -> Info {
        Info::default()
    }

    /// Set the title of the info block, modifying `self`
    pub fn title<S: ToString>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.to_string());
        self
    }

    /// Set the author of the info block, modifying `self`
    pub fn author<S: ToString>(&mut self, author: S) -> &mut Self {
        self.author = Some(author.to_string());
        self
    }

    /// Set the creation date of the info block, modifying `self`
    pub fn created(&mut self, created: DateTime<Local>) -> &mut Self {
        self.created = Some(created);
        self
    }

    pub(crate) fn write<W: Write + Seek>(
        &self,
        directory: &mut DirectoryEncoder<'_, W, TiffKindStandard>,
        page_number: usize,
        total_pages: usize,
    ) -> TiffResult<()> {
        if let Some(title) = &self.title {
            directory.write_tag(Tag::ImageDescription, title.as_str())?;
        }
        if let Some(author) = &self.author {
            directory.write_tag(Tag::Artist, author.as_str())?;
        }
        directory.write_tag(
            Tag::Software,
            concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION")),
        )?;

        let created = self.created.unwrap_or_else(Local::now);
        let date = created.format("%Y:%m:%d %H:%M:%S").to_string();
        directory.write_tag(Tag::DateTime, date.as_str())?;

        // zero-based page, then the page count
        let page = [
            page_number.saturating_sub(1).min(u16::MAX as usize) as u16,
            total_pages.min(u16::MAX as usize) as u16,
        ];
        directory.write_tag(Tag::Unknown(PAGE_NUMBER_TAG), &page[..])?;

        Ok(())
    }
}
