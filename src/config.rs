use crate::colour::{colours, Colour};
use crate::rect::Rect;
use crate::units::{Pt, Px};
use crate::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The literal marker that forces a new page
pub const DEFAULT_PAGE_BREAK: &str = "--- PAGE BREAK ---";

/// Empirical average glyph width, as a fraction of the font size
pub const APPROX_CHAR_WIDTH: f32 = 0.6;

/// Vertical space reserved below the body text for the footer
pub const FOOTER_RESERVE: u32 = 30;

/// Settings for one conversion. Built by the caller and only ever read while
/// paginating and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Page width in pixels
    pub page_width: u32,
    /// Page height in pixels
    pub page_height: u32,
    /// Margin on every side, in pixels
    pub margin: u32,
    /// Family name of the body font
    pub font_name: String,
    /// Explicit font file, takes precedence over `font_name`
    pub font_path: Option<PathBuf>,
    /// Body font size in points
    pub font_size: f32,
    /// Budget of estimated display rows per page
    pub lines_per_page: usize,
    pub page_break_marker: String,
    /// Resolution used to convert points to pixels, and written to the output
    pub dpi: u32,
    pub background: Colour,
    pub text_colour: Colour,
    pub header_colour: Colour,
    pub include_page_numbers: bool,
    pub include_timestamp: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            page_width: 850,
            page_height: 1100,
            margin: 50,
            font_name: "Arial".to_string(),
            font_path: None,
            font_size: 11.0,
            lines_per_page: 45,
            page_break_marker: DEFAULT_PAGE_BREAK.to_string(),
            dpi: 96,
            background: colours::WHITE,
            text_colour: colours::BLACK,
            header_colour: colours::GREY,
            include_page_numbers: true,
            include_timestamp: true,
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) JSON configuration; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<LayoutConfig> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<LayoutConfig> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConvertError::InputNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that the settings describe a page that text can be laid out on
    pub fn validate(&self) -> Result<()> {
        if self.page_width == 0 || self.page_height == 0 {
            return Err(ConvertError::InvalidConfig(format!(
                "page size {}x{} is empty",
                self.page_width, self.page_height
            )));
        }
        if self.page_width <= 2 * self.margin
            || self.page_height <= 2 * self.margin + FOOTER_RESERVE
        {
            return Err(ConvertError::InvalidConfig(format!(
                "margin {} leaves no text area on a {}x{} page",
                self.margin, self.page_width, self.page_height
            )));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "font size {} must be positive",
                self.font_size
            )));
        }
        if self.page_break_marker.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "page break marker must not be empty".to_string(),
            ));
        }
        if self.dpi == 0 {
            return Err(ConvertError::InvalidConfig("dpi must be positive".to_string()));
        }
        Ok(())
    }

    /// Width available to body text, between the left and right margins
    pub fn usable_width(&self) -> f32 {
        self.page_width as f32 - 2.0 * self.margin as f32
    }

    /// How many characters the width heuristic assumes fit on one display row.
    /// Never less than 1.
    pub fn chars_per_line(&self) -> usize {
        let approx_char_width = self.font_size * APPROX_CHAR_WIDTH;
        let chars = (self.usable_width() / approx_char_width).floor();
        if chars.is_finite() && chars >= 1.0 {
            chars as usize
        } else {
            1
        }
    }

    /// The margin-bounded area body text is drawn into
    pub fn text_area(&self) -> Rect {
        let margin = Px::from(self.margin);
        Rect::from_origin_size(
            margin,
            margin,
            Px::from(self.page_width) - margin * 2.0,
            Px::from(self.page_height) - margin * 2.0 - Px::from(FOOTER_RESERVE),
        )
    }

    /// Body font size in pixels
    pub fn font_px(&self) -> Px {
        Pt(self.font_size).to_px(self.dpi)
    }

    /// Header and footer font size in pixels, two points below the body size
    pub fn header_font_px(&self) -> Px {
        Pt((self.font_size - 2.0).max(1.0)).to_px(self.dpi)
    }
}
