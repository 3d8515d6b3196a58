//! Planning where text goes: splitting text into pages, and wrapping a page's
//! text into display rows.
//!
//! Pagination works on an estimate of how many display rows each source line
//! will occupy ([LineMeasure]). The default estimate,
//! [CharWidthEstimate], assumes every character is `0.6 × font size` wide and
//! never looks at a font; [FontMeasure] uses real glyph advances instead.
//! Rendering always wraps with real glyph advances via [wrap_text].
//!
//! # Example
//!
//! ```
//! use text2tiff::LayoutConfig;
//! use text2tiff::layout::Paginator;
//!
//! let config = LayoutConfig::default();
//! let document = Paginator::new(&config).paginate("A\n--- PAGE BREAK ---\nB");
//! assert_eq!(document.len(), 2);
//! ```

mod paginate;
mod text;

pub use paginate::*;
pub use text::*;
