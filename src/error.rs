use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversions
pub type Result<T> = std::result::Result<T, ConvertError>;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input file or directory does not exist
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Pagination produced nothing to render; no output is written
    #[error("no pages to convert")]
    NoPagesProduced,

    /// There is no multi-page raster encoder for the requested output
    #[error("no multi-page encoder available for {}", .path.display())]
    EncoderUnavailable { path: PathBuf },

    /// One source of a batch could not be read
    #[error("error reading file {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory contained no `.txt` files
    #[error("no .txt files found in {}", .0.display())]
    NoSourceFiles(PathBuf),

    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),

    /// No usable font face was found
    #[error("font not found: {0}")]
    FontNotFound(String),

    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [ab_glyph] could not read the glyph outlines of the font
    InvalidFont(#[from] ab_glyph::InvalidFont),

    #[error(transparent)]
    /// The TIFF encoder failed
    Tiff(#[from] tiff::TiffError),

    #[error(transparent)]
    /// A configuration file could not be parsed
    Config(#[from] serde_json::Error),
}
