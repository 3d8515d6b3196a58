use ab_glyph::{point, Font as _, GlyphId};
use chrono::{DateTime, Local};
use image::{Rgb, RgbImage};

use crate::colour::{blend, Colour};
use crate::config::LayoutConfig;
use crate::font::Font;
use crate::layout::{rows_that_fit, wrap_text};
use crate::units::Px;
use crate::Result;

/// Offset of the page number from the top right corner of the text area
const HEADER_OFFSET: (f32, f32) = (100.0, 30.0);
/// Offset of the timestamp below the bottom margin
const FOOTER_OFFSET: f32 = 10.0;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Turns the text of one page into a raster frame
pub trait Renderer {
    /// Render `text` as page `page_number` (1-based) of `total_pages`
    fn render_page(&self, text: &str, page_number: usize, total_pages: usize) -> Result<RgbImage>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render_page(&self, text: &str, page_number: usize, total_pages: usize) -> Result<RgbImage> {
        (**self).render_page(text, page_number, total_pages)
    }
}

/// Draws pages with a real font: a page number header, the body text
/// word-wrapped inside the text area, and a timestamp footer.
///
/// Body rows that don't fit entirely inside the text area are left out rather
/// than drawn partially.
pub struct RasterRenderer<'a> {
    config: &'a LayoutConfig,
    font: Font,
    header_font: Option<Font>,
    timestamp: Option<DateTime<Local>>,
}

impl<'a> RasterRenderer<'a> {
    /// Resolve the configured font and build a renderer for it. Headers and
    /// footers use the italic face of the same family when one is installed.
    pub fn new(config: &'a LayoutConfig) -> Result<Self> {
        config.validate()?;
        let font = Font::for_config(config)?;
        let header_font = font.italic_variant();
        Ok(RasterRenderer {
            config,
            font,
            header_font,
            timestamp: None,
        })
    }

    /// Render with an already loaded font for everything
    pub fn with_font(config: &'a LayoutConfig, font: Font) -> Self {
        RasterRenderer {
            config,
            font,
            header_font: None,
            timestamp: None,
        }
    }

    /// Stamp every page with `timestamp` instead of the current time
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    fn header_font(&self) -> &Font {
        self.header_font.as_ref().unwrap_or(&self.font)
    }
}

impl Renderer for RasterRenderer<'_> {
    fn render_page(&self, text: &str, page_number: usize, total_pages: usize) -> Result<RgbImage> {
        let config = self.config;
        let mut image =
            RgbImage::from_pixel(config.page_width, config.page_height, config.background.to_rgb());

        let page_width = Px::from(config.page_width);
        let page_height = Px::from(config.page_height);
        let margin = Px::from(config.margin);

        if config.include_page_numbers {
            let header = format!("Page {page_number} of {total_pages}");
            draw_text(
                &mut image,
                self.header_font(),
                config.header_font_px(),
                &header,
                (
                    page_width - margin - Px(HEADER_OFFSET.0),
                    margin - Px(HEADER_OFFSET.1),
                ),
                config.header_colour,
            );
        }

        let area = config.text_area();
        let size = config.font_px();
        let rows = wrap_text(text.trim(), area.width(), |s| {
            self.font.width_of_text(s, size)
        });
        let line_height = self.font.line_height(size);
        let visible = rows_that_fit(line_height, area.height());
        if rows.len() > visible {
            log::debug!(
                "page {page_number}: {} of {} rows fit, the rest is clipped",
                visible,
                rows.len()
            );
        }

        let mut y = area.y1;
        for row in rows.iter().take(visible) {
            draw_text(&mut image, &self.font, size, row, (area.x1, y), config.text_colour);
            y += line_height;
        }

        if config.include_timestamp {
            let now = self.timestamp.unwrap_or_else(Local::now);
            let footer = now.format(TIMESTAMP_FORMAT).to_string();
            draw_text(
                &mut image,
                self.header_font(),
                config.header_font_px(),
                &footer,
                (margin, page_height - margin + Px(FOOTER_OFFSET)),
                config.header_colour,
            );
        }

        Ok(image)
    }
}

/// Draw a single row of text whose top-left corner sits at `origin`.
/// Returns the x coordinate where the row ended.
pub fn draw_text(
    image: &mut RgbImage,
    font: &Font,
    size: Px,
    text: &str,
    origin: (Px, Px),
    colour: Colour,
) -> Px {
    let colour = colour.to_rgb();
    let baseline = origin.1 + font.ascent(size);
    let mut x = origin.0;

    for ch in text.chars() {
        let Some(gid) = font.glyph_or_replacement(ch) else {
            continue;
        };
        if !ch.is_whitespace() {
            draw_glyph(image, font, gid, size, (x, baseline), colour);
        }
        x += font.advance(gid, size);
    }

    x
}

/// Rasterize one glyph with its pen position at `(x, baseline)` and blend it
/// onto the image. Parts falling outside the image are dropped.
fn draw_glyph(image: &mut RgbImage, font: &Font, gid: GlyphId, size: Px, pen: (Px, Px), colour: Rgb<u8>) {
    let glyph = gid.with_scale_and_position(font.scale(size), point(pen.0 .0, pen.1 .0));
    let Some(outlined) = font.glyphs().outline_glyph(glyph) else {
        return;
    };

    let bounds = outlined.px_bounds();
    let (image_width, image_height) = image.dimensions();
    outlined.draw(|gx, gy, coverage| {
        if coverage <= 0.0 {
            return;
        }
        let x = bounds.min.x as i64 + gx as i64;
        let y = bounds.min.y as i64 + gy as i64;
        if x < 0 || y < 0 || x >= image_width as i64 || y >= image_height as i64 {
            return;
        }
        let pixel = image.get_pixel_mut(x as u32, y as u32);
        *pixel = blend(*pixel, colour, coverage);
    });
}
