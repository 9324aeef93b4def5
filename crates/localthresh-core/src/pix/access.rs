//! Pixel access functions
//!
//! Functions for getting and setting individual pixels. Values are
//! returned as `u32` regardless of depth so callers can treat binary and
//! grayscale images uniformly.

use super::{Pix, PixMut};
use crate::error::{Error, Result};

impl Pix {
    /// Get a pixel value at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset lies outside the buffer.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        let idx = y as usize * self.width() as usize + x as usize;
        u32::from(self.data()[idx])
    }
}

impl PixMut {
    /// Get a pixel value at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        let idx = y as usize * self.width() as usize + x as usize;
        u32::from(self.data()[idx])
    }

    /// Set a pixel value at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if coordinates are out of bounds
    /// and [`Error::InvalidParameter`] if `val` does not fit the depth.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        if x >= self.width() {
            return Err(Error::IndexOutOfBounds {
                index: x as usize,
                len: self.width() as usize,
            });
        }
        if y >= self.height() {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height() as usize,
            });
        }
        let max = self.depth().max_value();
        if val > max {
            return Err(Error::InvalidParameter(format!(
                "value {val} exceeds maximum {max} for {} bpp",
                self.depth().bits()
            )));
        }
        self.set_pixel_unchecked(x, y, val);
        Ok(())
    }

    /// Set a pixel value without bounds or range checking.
    ///
    /// The value is truncated to a byte.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset lies outside the buffer.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, val: u32) {
        let idx = y as usize * self.width() as usize + x as usize;
        self.data_mut()[idx] = val as u8;
    }
}

#[cfg(test)]
mod tests {
    use crate::{Pix, PixelDepth};

    #[test]
    fn test_get_set_pixel() {
        let mut pm = Pix::new(5, 4, PixelDepth::Bit8).unwrap().to_mut();
        pm.set_pixel(4, 3, 200).unwrap();
        assert_eq!(pm.get_pixel(4, 3), Some(200));
        let pix: Pix = pm.into();
        assert_eq!(pix.get_pixel(4, 3), Some(200));
        assert_eq!(pix.get_pixel(5, 0), None);
        assert_eq!(pix.get_pixel(0, 4), None);
    }

    #[test]
    fn test_set_pixel_errors() {
        let mut pm = Pix::new(2, 2, PixelDepth::Bit1).unwrap().to_mut();
        assert!(pm.set_pixel(2, 0, 1).is_err());
        assert!(pm.set_pixel(0, 2, 1).is_err());
        assert!(pm.set_pixel(0, 0, 2).is_err());
        assert!(pm.set_pixel(1, 1, 1).is_ok());
    }
}
