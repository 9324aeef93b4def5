//! localthresh-io - Image I/O
//!
//! Reads and writes the single-channel images consumed and produced by the
//! thresholder. Supported formats:
//!
//! - PNG (feature `png-format`, default)
//! - PNM: PBM and PGM, ASCII and binary (feature `pnm`, default)
//!
//! Formats are detected from magic bytes on read; on write the caller picks
//! the format, or uses [`format_from_extension`].

mod error;
pub mod format;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes, format_from_extension};
pub use localthresh_core::ImageFormat;

use localthresh_core::Pix;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Read an image from a file path
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    let file = File::open(path)?;
    read_image_format(BufReader::new(file), format)
}

/// Read an image from an in-memory buffer
pub fn read_image_mem(data: &[u8]) -> IoResult<Pix> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(Cursor::new(data), format)
}

fn read_image_format<R: std::io::BufRead + std::io::Seek>(
    reader: R,
    format: ImageFormat,
) -> IoResult<Pix> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(reader),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(reader),
        _ => Err(IoError::UnsupportedFormat(format!(
            "reading {:?} is not enabled",
            format
        ))),
    }
}

/// Write an image to a file path
///
/// Parent directories are not created; callers own the output layout.
pub fn write_image<P: AsRef<Path>>(pix: &Pix, path: P, format: ImageFormat) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_image_format(pix, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Write an image to an in-memory buffer
pub fn write_image_mem(pix: &Pix, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_image_format(pix, &mut buffer, format)?;
    Ok(buffer)
}

fn write_image_format<W: Write>(
    pix: &Pix,
    writer: W,
    format: ImageFormat,
) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(pix, writer),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::write_pnm(pix, writer),
        _ => Err(IoError::UnsupportedFormat(format!(
            "writing {:?} is not enabled",
            format
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localthresh_core::PixelDepth;

    #[test]
    fn test_mem_roundtrip_detects_format() {
        let pix = Pix::from_raw(3, 2, PixelDepth::Bit8, vec![0, 50, 100, 150, 200, 250]).unwrap();
        for format in [ImageFormat::Png, ImageFormat::Pnm] {
            let bytes = write_image_mem(&pix, format).unwrap();
            let back = read_image_mem(&bytes).unwrap();
            assert_eq!(back.informat(), format);
            assert_eq!(back.data(), pix.data());
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        let pix = Pix::new(1, 1, PixelDepth::Bit8).unwrap();
        assert!(write_image_mem(&pix, ImageFormat::Unknown).is_err());
        assert!(read_image_mem(b"XYZW").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_image("/nonexistent/path/image.png"),
            Err(IoError::Io(_))
        ));
    }
}
