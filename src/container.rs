use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::RgbImage;
use tiff::encoder::{colortype, compression::Lzw, Rational, TiffEncoder};
use tiff::tags::ResolutionUnit;

use crate::info::Info;
use crate::{ConvertError, Result};

/// Collects rendered frames into one multi-page output file
pub trait ContainerWriter {
    /// Append `frame` as page `page_number` (1-based) of `total_pages`
    fn write_frame(&mut self, frame: &RgbImage, page_number: usize, total_pages: usize) -> Result<()>;

    /// Terminate the frame sequence and flush everything to its destination.
    /// Calling it more than once is harmless.
    fn finish(&mut self) -> Result<()>;
}

/// Output file handle shared between the encoder and the writer, so the
/// writer can flush (and see flush errors) once the encoder is gone
#[derive(Clone)]
struct SharedFile(Rc<RefCell<BufWriter<File>>>);

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

impl Seek for SharedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.borrow_mut().seek(pos)
    }
}

/// Writes a multi-page TIFF: one LZW-compressed RGB image per frame.
///
/// Every frame is a complete image directory as soon as
/// [write_frame](ContainerWriter::write_frame) returns. The file is flushed by
/// [finish](ContainerWriter::finish), or when the writer is dropped if an
/// error cut the conversion short, so the file never ends in a half-written
/// directory.
pub struct TiffWriter {
    path: PathBuf,
    file: SharedFile,
    encoder: Option<TiffEncoder<SharedFile>>,
    info: Info,
    dpi: u32,
    frames: usize,
}

impl TiffWriter {
    /// Whether there is an encoder for the extension of `path`
    pub fn supports<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                ext == "tif" || ext == "tiff"
            })
            .unwrap_or(false)
    }

    /// Create (or truncate) the output file. Fails with
    /// [ConvertError::EncoderUnavailable] before touching the file system if
    /// the extension isn't a TIFF one.
    pub fn create<P: AsRef<Path>>(path: P, dpi: u32) -> Result<TiffWriter> {
        let path = path.as_ref();
        if !Self::supports(path) {
            return Err(ConvertError::EncoderUnavailable {
                path: path.to_path_buf(),
            });
        }

        let file = SharedFile(Rc::new(RefCell::new(BufWriter::new(File::create(path)?))));
        let encoder = TiffEncoder::new(file.clone())?;
        log::debug!("opened {} for writing", path.display());

        Ok(TiffWriter {
            path: path.to_path_buf(),
            file,
            encoder: Some(encoder),
            info: Info::default(),
            dpi,
            frames: 0,
        })
    }

    /// Metadata to embed in every frame
    pub fn with_info(mut self, info: Info) -> TiffWriter {
        self.info = info;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How many frames have been written so far
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl ContainerWriter for TiffWriter {
    fn write_frame(&mut self, frame: &RgbImage, page_number: usize, total_pages: usize) -> Result<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| io::Error::other("frame written after the container was finished"))?;

        let (width, height) = frame.dimensions();
        let mut image =
            encoder.new_image_with_compression::<colortype::RGB8, _>(width, height, Lzw::default())?;
        image.resolution(ResolutionUnit::Inch, Rational { n: self.dpi, d: 1 });
        self.info.write(image.encoder(), page_number, total_pages)?;
        image.write_data(frame.as_raw())?;

        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(encoder) = self.encoder.take() {
            drop(encoder);
            self.file.0.borrow_mut().flush()?;
            log::debug!("finished {} with {} frames", self.path.display(), self.frames);
        }
        Ok(())
    }
}

impl Drop for TiffWriter {
    fn drop(&mut self) {
        if let Err(err) = self.finish() {
            log::error!("failed to finalize {}: {err}", self.path.display());
        }
    }
}
