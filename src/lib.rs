//! Render plain text into paginated, multi-page TIFF documents.
//!
//! Text is split into pages by [layout::Paginator] using a cheap estimate of
//! how many rows each line wraps to, then every page is drawn by a [Renderer]
//! and appended as one frame by a [ContainerWriter]. [convert::Converter] wires
//! the default implementations of both together.

mod colour;
pub use colour::*;

mod config;
pub use config::*;

mod container;
pub use container::*;

/// End-to-end conversions of text, files and directories
pub mod convert;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod info;
pub use info::*;

/// Pagination and text wrapping
pub mod layout;

mod page;
pub use page::*;

mod rect;
pub use rect::*;

mod render;
pub use render::*;

mod units;
pub use units::*;

/// Re-export of the raster type frames are rendered into
pub use image::RgbImage;
