//! Per-block mask classification
//!
//! A full-resolution pixel of intensity `v` in the block footprint is looked
//! up in the block's histogram. Intensities more frequent than the threshold
//! (`h[v] > t`) become 0; rarer ones become 1.

use crate::histogram::SmoothedHistogram;
use crate::{BlockIndex, FilterError, FilterResult};
use localthresh_core::{Pix, PixMut, PixelDepth};

/// Classify the footprint of `block` into `mask`
///
/// The footprint is `[col * scale, (col + 1) * scale) x [row * scale, (row + 1) * scale)`
/// in full-resolution coordinates. Pixels outside it are not touched.
///
/// # Arguments
/// * `full_res` - 8 bpp full-resolution image
/// * `histogram` - Smoothed histogram of the block
/// * `threshold` - Cap found by the threshold search
/// * `block` - Block being classified
/// * `scale` - Full-resolution pixels per downsampled pixel, per axis
/// * `mask` - 1 bpp mask of the same size as `full_res`
pub fn apply_mask(
    full_res: &Pix,
    histogram: &SmoothedHistogram,
    threshold: f64,
    block: BlockIndex,
    scale: u32,
    mask: &mut PixMut,
) -> FilterResult<()> {
    if full_res.depth() != PixelDepth::Bit8 {
        return Err(FilterError::UnsupportedDepth {
            expected: "8 bpp",
            actual: full_res.depth().bits(),
        });
    }
    if mask.depth() != PixelDepth::Bit1 {
        return Err(FilterError::UnsupportedDepth {
            expected: "1 bpp",
            actual: mask.depth().bits(),
        });
    }
    if mask.width() != full_res.width() || mask.height() != full_res.height() {
        return Err(FilterError::InvalidParameters(format!(
            "mask is {}x{} but image is {}x{}",
            mask.width(),
            mask.height(),
            full_res.width(),
            full_res.height()
        )));
    }
    let end_x = (u64::from(block.col) + 1) * u64::from(scale);
    let end_y = (u64::from(block.row) + 1) * u64::from(scale);
    if scale == 0 || end_x > u64::from(full_res.width()) || end_y > u64::from(full_res.height()) {
        return Err(FilterError::InvalidParameters(format!(
            "footprint of block {block} at scale {scale} exceeds {}x{} image",
            full_res.width(),
            full_res.height()
        )));
    }

    fill_footprint(full_res, histogram, threshold, block, scale, mask.data_mut(), 0);
    Ok(())
}

/// Write one footprint into `strip`, which holds mask rows starting at `strip_y0`
///
/// The caller guarantees the footprint lies inside both the image and the strip.
pub(crate) fn fill_footprint(
    full_res: &Pix,
    histogram: &SmoothedHistogram,
    threshold: f64,
    block: BlockIndex,
    scale: u32,
    strip: &mut [u8],
    strip_y0: u32,
) {
    let width = full_res.width() as usize;
    let x0 = (block.col * scale) as usize;
    let x1 = x0 + scale as usize;
    let y0 = block.row * scale;

    for y in y0..y0 + scale {
        let src = &full_res.row_data(y)[x0..x1];
        let offset = (y - strip_y0) as usize * width;
        let dst = &mut strip[offset + x0..offset + x1];
        for (d, &v) in dst.iter_mut().zip(src) {
            *d = u8::from(histogram.get(v) <= threshold);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32, height: u32) -> Pix {
        let data = (0..width * height).map(|i| (i % 256) as u8).collect();
        Pix::from_raw(width, height, PixelDepth::Bit8, data).unwrap()
    }

    fn step_histogram() -> SmoothedHistogram {
        // Intensities below 10 are frequent, everything else rare
        let mut bins = [0.0; 256];
        bins[..10].fill(0.1);
        SmoothedHistogram::from_bins(bins)
    }

    #[test]
    fn test_classifies_footprint_only() {
        let full = ramp(8, 8);
        let mut mask = Pix::new(8, 8, PixelDepth::Bit1).unwrap().to_mut();
        apply_mask(&full, &step_histogram(), 0.05, BlockIndex::new(0, 0), 4, &mut mask).unwrap();

        for y in 0..8 {
            for x in 0..8 {
                let expected = if x < 4 && y < 4 {
                    let v = full.get_pixel(x, y).unwrap();
                    u32::from(v >= 10)
                } else {
                    0
                };
                assert_eq!(mask.get_pixel(x, y), Some(expected), "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_value_equal_to_threshold_is_one() {
        let full = Pix::from_raw(2, 2, PixelDepth::Bit8, vec![0, 0, 0, 200]).unwrap();
        let mut mask = Pix::new(2, 2, PixelDepth::Bit1).unwrap().to_mut();
        apply_mask(&full, &step_histogram(), 0.1, BlockIndex::new(0, 0), 2, &mut mask).unwrap();
        assert_eq!(mask.data(), &[1, 1, 1, 1]);

        apply_mask(&full, &step_histogram(), 0.09, BlockIndex::new(0, 0), 2, &mut mask).unwrap();
        assert_eq!(mask.data(), &[0, 0, 0, 1]);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let full = ramp(8, 8);
        let h = step_histogram();
        let mut mask = Pix::new(8, 8, PixelDepth::Bit1).unwrap().to_mut();
        assert!(apply_mask(&full, &h, 0.0, BlockIndex::new(2, 0), 4, &mut mask).is_err());
        assert!(apply_mask(&full, &h, 0.0, BlockIndex::new(0, 0), 0, &mut mask).is_err());

        let mut small = Pix::new(4, 8, PixelDepth::Bit1).unwrap().to_mut();
        assert!(apply_mask(&full, &h, 0.0, BlockIndex::new(0, 0), 4, &mut small).is_err());

        let mut gray = Pix::new(8, 8, PixelDepth::Bit8).unwrap().to_mut();
        assert!(matches!(
            apply_mask(&full, &h, 0.0, BlockIndex::new(0, 0), 4, &mut gray),
            Err(FilterError::UnsupportedDepth { .. })
        ));
    }
}
