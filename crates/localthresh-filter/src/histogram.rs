//! Smoothed local histograms
//!
//! A block's histogram is built from the 3x3 neighborhood around it in the
//! downsampled image: every neighbor of intensity `p` adds the kernel row
//! `K[p]`, so each sample spreads over nearby intensities instead of landing
//! in a single bin. The accumulated histogram is then scaled to unit mass.

use crate::kernel::{GaussianKernelTable, INTENSITY_LEVELS};
use crate::{BlockIndex, FilterError, FilterResult};
use localthresh_core::{Pix, PixelDepth};

/// Per-block intensity distribution, one entry per gray level
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedHistogram {
    bins: [f64; INTENSITY_LEVELS],
}

impl SmoothedHistogram {
    /// Wrap raw bin values without normalizing them
    pub fn from_bins(bins: [f64; INTENSITY_LEVELS]) -> Self {
        Self { bins }
    }

    #[inline]
    pub fn bins(&self) -> &[f64; INTENSITY_LEVELS] {
        &self.bins
    }

    /// Value of the bin for intensity `level`
    #[inline]
    pub fn get(&self, level: u8) -> f64 {
        self.bins[level as usize]
    }

    /// Largest bin value
    pub fn max(&self) -> f64 {
        self.bins.iter().copied().fold(0.0, f64::max)
    }

    /// Sum of all bins
    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }

    /// Intensity of the largest bin (lowest intensity on ties)
    pub fn peak(&self) -> u8 {
        let mut best = 0;
        for (i, &v) in self.bins.iter().enumerate() {
            if v > self.bins[best] {
                best = i;
            }
        }
        best as u8
    }
}

/// Estimate the smoothed histogram of one interior block
///
/// # Arguments
/// * `downsampled` - 8 bpp low-resolution image
/// * `block` - Block whose 3x3 neighborhood is sampled
/// * `table` - Kernel table supplying the per-intensity weights
///
/// # Errors
///
/// `UnsupportedDepth` for non-8 bpp input, `InvalidParameters` if the block
/// lies on the image border (it has no full neighborhood).
pub fn estimate_histogram(
    downsampled: &Pix,
    block: BlockIndex,
    table: &GaussianKernelTable,
) -> FilterResult<SmoothedHistogram> {
    if downsampled.depth() != PixelDepth::Bit8 {
        return Err(FilterError::UnsupportedDepth {
            expected: "8 bpp",
            actual: downsampled.depth().bits(),
        });
    }
    if !block.is_interior(downsampled.width(), downsampled.height()) {
        return Err(FilterError::InvalidParameters(format!(
            "block {block} has no full 3x3 neighborhood in a {}x{} image",
            downsampled.width(),
            downsampled.height()
        )));
    }
    Ok(estimate_interior(downsampled, block, table))
}

/// Histogram of a block already known to be interior to an 8 bpp image
pub(crate) fn estimate_interior(
    downsampled: &Pix,
    block: BlockIndex,
    table: &GaussianKernelTable,
) -> SmoothedHistogram {
    let mut bins = [0.0; INTENSITY_LEVELS];
    let c = block.col as usize;

    for y in block.row - 1..=block.row + 1 {
        let line = downsampled.row_data(y);
        for &p in &line[c - 1..=c + 1] {
            for (acc, &w) in bins.iter_mut().zip(table.row(p)) {
                *acc += w;
            }
        }
    }

    // Diagonal entries are 1, so the total is at least 9
    let total: f64 = bins.iter().sum();
    for v in &mut bins {
        *v /= total;
    }
    SmoothedHistogram { bins }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Pix {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Pix::from_raw(width, height, PixelDepth::Bit8, data).unwrap()
    }

    #[test]
    fn test_sums_to_one() {
        let table = GaussianKernelTable::new(15.0).unwrap();
        let pix = gray(5, 4, |x, y| ((x * 53 + y * 91) % 256) as u8);
        for row in 1..3 {
            for col in 1..4 {
                let h = estimate_histogram(&pix, BlockIndex::new(row, col), &table).unwrap();
                assert!((h.total() - 1.0).abs() < 1e-6);
                assert!(h.bins().iter().all(|&v| v >= 0.0));
            }
        }
    }

    #[test]
    fn test_uniform_neighborhood_peaks_at_value() {
        let table = GaussianKernelTable::new(15.0).unwrap();
        let pix = gray(3, 3, |_, _| 128);
        let h = estimate_histogram(&pix, BlockIndex::new(1, 1), &table).unwrap();
        assert_eq!(h.peak(), 128);
        assert_eq!(h.max(), h.get(128));
        // Symmetric around the peak
        assert!((h.get(118) - h.get(138)).abs() < 1e-15);
    }

    #[test]
    fn test_only_neighborhood_is_sampled() {
        let table = GaussianKernelTable::new(5.0).unwrap();
        let a = gray(5, 5, |x, y| if x == 4 || y == 4 { 255 } else { 40 });
        let b = gray(5, 5, |_, _| 40);
        let block = BlockIndex::new(1, 1);
        assert_eq!(
            estimate_histogram(&a, block, &table).unwrap(),
            estimate_histogram(&b, block, &table).unwrap()
        );
    }

    #[test]
    fn test_block_total_equals_sum_of_row_sums() {
        let table = GaussianKernelTable::new(15.0).unwrap();
        let pix = gray(3, 3, |x, y| (x * 100 + y * 20) as u8);
        let h = estimate_histogram(&pix, BlockIndex::new(1, 1), &table).unwrap();

        let norm: f64 = pix.data().iter().map(|&p| table.row_sum(p)).sum();
        for i in 0..=255u8 {
            let raw: f64 = pix.data().iter().map(|&p| table.weight(p, i)).sum();
            assert!((h.get(i) - raw / norm).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rejects_border_blocks_and_binary_input() {
        let table = GaussianKernelTable::new(15.0).unwrap();
        let pix = gray(4, 4, |_, _| 0);
        for (row, col) in [(0, 1), (1, 0), (3, 1), (1, 3)] {
            assert!(matches!(
                estimate_histogram(&pix, BlockIndex::new(row, col), &table),
                Err(FilterError::InvalidParameters(_))
            ));
        }
        let bin = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        assert!(matches!(
            estimate_histogram(&bin, BlockIndex::new(1, 1), &table),
            Err(FilterError::UnsupportedDepth { .. })
        ));
    }
}
