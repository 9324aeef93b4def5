//! PIX - The image container
//!
//! The `Pix` structure is the image type shared by every crate in the
//! workspace. Two depths are supported: 8 bpp grayscale for the threshold
//! inputs and 1 bpp for the binary masks it produces.
//!
//! # Pixel layout
//!
//! - One byte per pixel, rows stored top to bottom without padding
//! - 1 bpp images hold only the values 0 and 1
//!
//! # Ownership model
//!
//! Cloning a `Pix` shares its buffer. Writes go through a [`PixMut`],
//! obtained without copying from a sole owner ([`Pix::try_into_mut`]) or
//! as a fresh copy ([`Pix::to_mut`]); `PixMut` converts back with `into()`.

mod access;
pub mod convert;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Pixel depth (bits per pixel)
///
/// Represents the number of bits of information carried by each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PixelDepth {
    /// 1-bit binary image
    Bit1 = 1,
    /// 8-bit grayscale
    Bit8 = 8,
}

impl PixelDepth {
    /// Get the number of bits per pixel.
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Get the maximum pixel value representable at this depth.
    pub fn max_value(self) -> u32 {
        (1u32 << self.bits()) - 1
    }
}

/// Image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Unknown format
    #[default]
    Unknown,
    /// PNG format
    Png,
    /// PNM format (PBM / PGM)
    Pnm,
}

impl ImageFormat {
    /// Get the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Unknown => "dat",
            Self::Png => "png",
            Self::Pnm => "pnm",
        }
    }
}

/// Shared pixel storage behind `Pix`
#[derive(Debug, Clone)]
struct PixData {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Depth in bits per pixel
    depth: PixelDepth,
    /// Input file format
    informat: ImageFormat,
    /// The image data, one byte per pixel
    data: Vec<u8>,
}

/// PIX - Image container
///
/// `Pix` uses reference counting via `Arc` for efficient cloning.
///
/// # Examples
///
/// ```
/// use localthresh_core::{Pix, PixelDepth};
///
/// // Create a new 8-bit grayscale image
/// let pix = Pix::new(640, 480, PixelDepth::Bit8).unwrap();
/// assert_eq!(pix.width(), 640);
/// assert_eq!(pix.height(), 480);
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Create a new PIX with the specified dimensions and depth.
    ///
    /// The image data is initialized to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let inner = PixData {
            width,
            height,
            depth,
            informat: ImageFormat::Unknown,
            data: vec![0u8; (width as usize) * (height as usize)],
        };

        Ok(Pix {
            inner: Arc::new(inner),
        })
    }

    /// Create a PIX that takes ownership of a row-major pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] for a zero-sized image,
    /// [`Error::IndexOutOfBounds`] if `data` does not hold exactly
    /// `width * height` bytes, and [`Error::InvalidParameter`] if a value
    /// exceeds the depth's maximum.
    pub fn from_raw(width: u32, height: u32, depth: PixelDepth, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let len = (width as usize) * (height as usize);
        if data.len() != len {
            return Err(Error::IndexOutOfBounds {
                index: data.len(),
                len,
            });
        }
        let max = depth.max_value();
        if let Some(bad) = data.iter().find(|&&v| u32::from(v) > max) {
            return Err(Error::InvalidParameter(format!(
                "value {bad} exceeds maximum {max} for {} bpp",
                depth.bits()
            )));
        }

        Ok(Pix {
            inner: Arc::new(PixData {
                width,
                height,
                depth,
                informat: ImageFormat::Unknown,
                data,
            }),
        })
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// File format the image was read from, `Unknown` if built in memory.
    #[inline]
    pub fn informat(&self) -> ImageFormat {
        self.inner.informat
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Get a slice over a single row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u8] {
        let w = self.inner.width as usize;
        let start = y as usize * w;
        &self.inner.data[start..start + w]
    }

    /// Zero-filled image of the same size, depth and input format.
    pub fn create_template(&self) -> Self {
        Pix {
            inner: Arc::new(PixData {
                width: self.inner.width,
                height: self.inner.height,
                depth: self.inner.depth,
                informat: self.inner.informat,
                data: vec![0u8; self.inner.data.len()],
            }),
        }
    }

    /// Whether both images share width, height and depth.
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.inner.width == other.inner.width
            && self.inner.height == other.inner.height
            && self.inner.depth == other.inner.depth
    }

    /// Take the buffer for writing if this is its only handle.
    ///
    /// Shared images are handed back unchanged in `Err`.
    pub fn try_into_mut(self) -> std::result::Result<PixMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(PixMut { inner: data }),
            Err(arc) => Err(Pix { inner: arc }),
        }
    }

    /// Copy the pixels into a new, writable image.
    pub fn to_mut(&self) -> PixMut {
        PixMut {
            inner: (*self.inner).clone(),
        }
    }
}

/// Uniquely owned, writable image
///
/// Freeze it into a shareable [`Pix`] with `into()`.
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Record the file format the pixels were decoded from.
    pub fn set_informat(&mut self, format: ImageFormat) {
        self.inner.informat = format;
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Get mutable access to the image data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.inner.data
    }
}

impl From<PixMut> for Pix {
    fn from(pix: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pix_creation() {
        let pix = Pix::new(100, 200, PixelDepth::Bit8).unwrap();
        assert_eq!(pix.width(), 100);
        assert_eq!(pix.height(), 200);
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        assert_eq!(pix.data().len(), 20_000);
        assert!(pix.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_pix_invalid_dimensions() {
        assert!(Pix::new(0, 100, PixelDepth::Bit8).is_err());
        assert!(Pix::new(100, 0, PixelDepth::Bit1).is_err());
    }

    #[test]
    fn test_depth_values() {
        assert_eq!(PixelDepth::Bit1.bits(), 1);
        assert_eq!(PixelDepth::Bit8.bits(), 8);
        assert_eq!(PixelDepth::Bit1.max_value(), 1);
        assert_eq!(PixelDepth::Bit8.max_value(), 255);
    }

    #[test]
    fn test_from_raw_validates() {
        assert!(Pix::from_raw(2, 2, PixelDepth::Bit8, vec![0, 1, 2, 3]).is_ok());
        assert!(Pix::from_raw(2, 2, PixelDepth::Bit8, vec![0, 1, 2]).is_err());
        assert!(Pix::from_raw(2, 1, PixelDepth::Bit1, vec![0, 2]).is_err());
    }

    #[test]
    fn test_try_into_mut_shared() {
        let pix = Pix::new(4, 4, PixelDepth::Bit8).unwrap();
        let shared = pix.clone();
        let pix = pix.try_into_mut().unwrap_err();
        drop(shared);
        assert!(pix.try_into_mut().is_ok());
    }

    #[test]
    fn test_to_mut_is_independent() {
        let pix = Pix::new(3, 3, PixelDepth::Bit8).unwrap();
        let mut pm = pix.to_mut();
        pm.data_mut().fill(7);
        let modified: Pix = pm.into();
        assert_eq!(pix.data()[0], 0);
        assert_eq!(modified.data()[0], 7);
    }

    #[test]
    fn test_row_data() {
        let pix = Pix::from_raw(3, 2, PixelDepth::Bit8, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(pix.row_data(1), &[4, 5, 6]);
        assert!(pix.sizes_equal(&pix.create_template()));
    }
}
