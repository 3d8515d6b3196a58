//! End-to-end conversions: read the input, paginate it, then render each page
//! into one frame of a multi-page TIFF.

use std::path::{Path, PathBuf};

use crate::container::TiffWriter;
use crate::info::Info;
use crate::layout::{Batch, CharWidthEstimate, FontMeasure, LineMeasure, Paginator, SourceUnit};
use crate::render::RasterRenderer;
use crate::{ConvertError, LayoutConfig, Result};

/// Output name used when converting text that didn't come from a file
pub const DEFAULT_TEXT_OUTPUT: &str = "multipage_output.tiff";
/// Output name used when combining a directory of files
pub const DEFAULT_COMBINED_OUTPUT: &str = "combined_output.tiff";

/// The outcome of one conversion
#[derive(Debug)]
pub struct Conversion {
    pub output: PathBuf,
    /// Frames written to the output
    pub pages: usize,
    /// Sources that ended up in the output
    pub sources: usize,
    /// Sources that were skipped because they couldn't be read
    pub failures: Vec<ConvertError>,
}

/// Converts text into multi-page TIFF files using one [LayoutConfig]
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: LayoutConfig,
    info: Info,
    exact_metrics: bool,
}

impl Converter {
    pub fn new(config: LayoutConfig) -> Converter {
        Converter {
            config,
            info: Info::default(),
            exact_metrics: false,
        }
    }

    /// Metadata written into every frame
    pub fn with_info(mut self, info: Info) -> Converter {
        self.info = info;
        self
    }

    /// Plan pages with the font's real glyph advances instead of the
    /// character-width estimate. Page contents will differ from the default.
    pub fn with_exact_metrics(mut self, exact_metrics: bool) -> Converter {
        self.exact_metrics = exact_metrics;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Convert a blob of text
    pub fn convert_text<P: AsRef<Path>>(&self, text: &str, output: P) -> Result<Conversion> {
        self.run(output.as_ref(), |paginator| Batch {
            document: paginator.paginate(text),
            sources: 1,
            failures: Vec::new(),
        })
    }

    /// Convert one text file. Without an explicit output, the TIFF is written
    /// next to the input with its extension changed to `.tiff`.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P, output: Option<&Path>) -> Result<Conversion> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConvertError::InputNotFound(path.to_path_buf()));
        }
        let source = SourceUnit::read(path)?;
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.with_extension("tiff"));
        self.convert_text(&source.content, output)
    }

    /// Combine every `.txt` file in `dir` into one TIFF
    pub fn convert_directory<P: AsRef<Path>, Q: AsRef<Path>>(&self, dir: P, output: Q) -> Result<Conversion> {
        let files = text_files_in(dir.as_ref())?;
        self.convert_files(&files, output)
    }

    /// Combine several text files into one TIFF, each introduced by a file
    /// banner and separated by an end-of-file page. Files that can't be read
    /// are reported in [Conversion::failures] and skipped.
    pub fn convert_files<P: AsRef<Path>, Q: AsRef<Path>>(&self, paths: &[P], output: Q) -> Result<Conversion> {
        self.run(output.as_ref(), |paginator| {
            paginator.paginate_many(paths.iter().map(|path| SourceUnit::read(path.as_ref())))
        })
    }

    fn run<F>(&self, output: &Path, plan: F) -> Result<Conversion>
    where
        F: FnOnce(&Paginator<'_, Measure<'_>>) -> Batch,
    {
        self.config.validate()?;
        if !TiffWriter::supports(output) {
            return Err(ConvertError::EncoderUnavailable {
                path: output.to_path_buf(),
            });
        }

        if self.exact_metrics {
            let renderer = RasterRenderer::new(&self.config)?;
            let measure = Measure::Font(FontMeasure::new(renderer.font(), &self.config));
            let batch = plan(&Paginator::with_measure(&self.config, measure));
            self.write(batch, &renderer, output)
        } else {
            let measure = Measure::Estimate(CharWidthEstimate::new(&self.config));
            let batch = plan(&Paginator::with_measure(&self.config, measure));
            // an empty plan fails before any font is looked up
            batch.document.ensure_not_empty()?;
            let renderer = RasterRenderer::new(&self.config)?;
            self.write(batch, &renderer, output)
        }
    }

    fn write(&self, batch: Batch, renderer: &RasterRenderer<'_>, output: &Path) -> Result<Conversion> {
        // nothing gets created on disk for an empty document
        batch.document.ensure_not_empty()?;

        let mut writer = TiffWriter::create(output, self.config.dpi)?.with_info(self.info.clone());
        let pages = batch.document.render(renderer, &mut writer)?;
        log::info!(
            "created {pages} pages from {} sources in {}",
            batch.sources,
            output.display()
        );

        Ok(Conversion {
            output: output.to_path_buf(),
            pages,
            sources: batch.sources,
            failures: batch.failures,
        })
    }
}

/// The line measure picked for a conversion
enum Measure<'f> {
    Estimate(CharWidthEstimate),
    Font(FontMeasure<'f>),
}

impl LineMeasure for Measure<'_> {
    fn wrapped_lines(&self, line: &str) -> usize {
        match self {
            Measure::Estimate(measure) => measure.wrapped_lines(line),
            Measure::Font(measure) => measure.wrapped_lines(line),
        }
    }
}

/// All `*.txt` files directly inside `dir`, sorted by path
pub fn text_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConvertError::InputNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_text = path.is_file()
            && path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("txt"))
                .unwrap_or(false);
        if is_text {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ConvertError::NoSourceFiles(dir.to_path_buf()));
    }
    Ok(files)
}

/// A short document that shows off automatic and explicit page breaks, used
/// when there is no input text
pub fn sample_text() -> String {
    let marker = crate::config::DEFAULT_PAGE_BREAK;
    format!(
        "Sample Document - Page 1
This document demonstrates converting plain text into a multi-page TIFF.
Long text is split across as many pages as it needs, based on how many
lines fit on each page.

Lorem ipsum dolor sit amet, consectetur adipiscing elit.
Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.

{marker}

Sample Document - Page 2
Put the page break marker on a line of its own to start a new page.

Features:
- Automatic page splitting
- Explicit page breaks
- Several text files combined into one output
- Configurable page size, margins, and font

{marker}

Sample Document - Page 3
This is the last page of the sample document.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_text_has_three_pages() {
        let config = LayoutConfig::default();
        let document = Paginator::new(&config).paginate(&sample_text());
        assert_eq!(document.len(), 3);
        assert!(document.pages[2].text().contains("last page"));
    }

    #[test]
    fn lists_text_files_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b.txt", "a.txt", "c.TXT", "notes.md"] {
            std::fs::write(dir.path().join(name), "x").expect("writes");
        }
        std::fs::create_dir(dir.path().join("d.txt")).expect("creates dir");

        let files = text_files_in(dir.path()).expect("lists");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.txt", "b.txt", "c.TXT"]);
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            text_files_in(dir.path()),
            Err(ConvertError::NoSourceFiles(_))
        ));
    }

    #[test]
    fn unsupported_output_is_refused_before_fonts_are_needed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let output = dir.path().join("out.gif");

        for exact_metrics in [false, true] {
            let converter = Converter::default().with_exact_metrics(exact_metrics);
            assert!(matches!(
                converter.convert_text("hello", &output),
                Err(ConvertError::EncoderUnavailable { path }) if path == output
            ));
        }
        assert!(!output.exists());
    }

    #[test]
    fn missing_inputs() {
        let converter = Converter::default();
        assert!(matches!(
            text_files_in(Path::new("/no/such/dir")),
            Err(ConvertError::InputNotFound(_))
        ));
        assert!(matches!(
            converter.convert_file("/no/such/file.txt", None),
            Err(ConvertError::InputNotFound(_))
        ));
    }
}
