//! Depth conversion and pixel counting
//!
//! Conversions between the binary masks produced by thresholding and the
//! 8 bpp images used for display and file output.

use super::{Pix, PixelDepth};
use crate::error::{Error, Result};

/// Luma weights used when collapsing RGB input to a single gray channel.
///
/// These are the ITU-R BT.601 coefficients.
pub const RED_WEIGHT: f32 = 0.299;
pub const GREEN_WEIGHT: f32 = 0.587;
pub const BLUE_WEIGHT: f32 = 0.114;

/// Convert an RGB triple to an 8-bit gray value using the BT.601 weights.
#[inline]
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    let gray = RED_WEIGHT * f32::from(r) + GREEN_WEIGHT * f32::from(g) + BLUE_WEIGHT * f32::from(b);
    (gray + 0.5).min(255.0) as u8
}

impl Pix {
    /// Count the number of ON (foreground) pixels in a binary image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 1 bpp.
    pub fn count_pixels(&self) -> Result<u64> {
        if self.depth() != PixelDepth::Bit1 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        Ok(self.data().iter().filter(|&&v| v != 0).count() as u64)
    }

    /// Convert 1 bpp to 8 bpp with value mapping.
    ///
    /// Each 0 in the source becomes `val0` (0-255) in the output,
    /// and each 1 becomes `val1` (0-255).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 1 bpp and
    /// [`Error::InvalidParameter`] if a mapped value exceeds 255.
    pub fn convert_1_to_8(&self, val0: u32, val1: u32) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit1 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        if val0 > 255 || val1 > 255 {
            return Err(Error::InvalidParameter(format!(
                "mapped values must be <= 255, got {val0} and {val1}"
            )));
        }
        let data = self
            .data()
            .iter()
            .map(|&v| if v == 0 { val0 as u8 } else { val1 as u8 })
            .collect();
        Pix::from_raw(self.width(), self.height(), PixelDepth::Bit8, data)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_gray() {
        assert_eq!(rgb_to_gray(0, 0, 0), 0);
        assert_eq!(rgb_to_gray(255, 255, 255), 255);
        assert_eq!(rgb_to_gray(100, 100, 100), 100);
    }

    #[test]
    fn test_count_pixels() {
        let pix = Pix::from_raw(3, 1, PixelDepth::Bit1, vec![1, 0, 1]).unwrap();
        assert_eq!(pix.count_pixels().unwrap(), 2);
        let gray = Pix::new(3, 1, PixelDepth::Bit8).unwrap();
        assert!(gray.count_pixels().is_err());
    }

    #[test]
    fn test_convert_1_to_8() {
        let pix = Pix::from_raw(2, 1, PixelDepth::Bit1, vec![0, 1]).unwrap();
        let out = pix.convert_1_to_8(0, 255).unwrap();
        assert_eq!(out.depth(), PixelDepth::Bit8);
        assert_eq!(out.data(), &[0, 255]);
        assert!(pix.convert_1_to_8(0, 256).is_err());
    }
}
