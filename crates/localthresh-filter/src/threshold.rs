//! Local adaptive thresholding
//!
//! Produces a full-resolution binary mask from a grayscale image and a
//! downsampled copy of it. Every interior cell of the downsampled image is a
//! block with its own threshold:
//!
//! 1. A smoothed histogram is estimated from the cell's 3x3 neighborhood
//! 2. Bisection finds the cap on histogram values that leaves the target mass
//! 3. The block's full-resolution footprint is classified against that cap
//!
//! The assembled mask is then closed with a square structuring element.
//!
//! # Example
//!
//! ```ignore
//! use localthresh_filter::{LocalThresholdOptions, LocalThresholder};
//!
//! let thresholder = LocalThresholder::new(LocalThresholdOptions::default())?;
//! let mask = thresholder.run(&full, &downsampled)?;
//! ```

use crate::histogram::estimate_interior;
use crate::kernel::GaussianKernelTable;
use crate::mask::fill_footprint;
use crate::search::search_threshold;
use crate::{BlockIndex, FilterError, FilterResult};
use localthresh_core::{Pix, PixelDepth};
use localthresh_morph::close_safe_brick;
use tracing::{debug, trace, warn};

// ============================================================================
// Default parameters
// ============================================================================

/// Default bisection iteration budget per block
pub const DEFAULT_NUM_THRESHOLDS: u32 = 100;

/// Default capped histogram mass the search aims for
pub const DEFAULT_TARGET_SUM: f64 = 0.5;

/// Default standard deviation of the intensity kernel
pub const DEFAULT_GAUS_STDEV: f64 = 15.0;

/// Default side of the square closing element
pub const DEFAULT_CLOSE_SIZE: u32 = 3;

// ============================================================================
// Option structures
// ============================================================================

/// What to do with a block whose threshold search runs out of iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvergencePolicy {
    /// Abort the run with `ThresholdSearchDidNotConverge`
    #[default]
    Fail,
    /// Leave the block's footprint at 0 and record it in the stats
    SkipBlock,
}

/// Options for local thresholding
#[derive(Debug, Clone)]
pub struct LocalThresholdOptions {
    /// Bisection iteration budget per block (> 0)
    pub num_thresholds: u32,
    /// Target capped mass, strictly between 0 and 1
    pub target_sum: f64,
    /// Kernel standard deviation in intensity units (> 0)
    pub gaus_stdev: f64,
    /// Side of the square closing element, odd; 1 disables closing
    pub close_size: u32,
    /// Handling of non-converged blocks
    pub policy: ConvergencePolicy,
}

impl Default for LocalThresholdOptions {
    fn default() -> Self {
        Self {
            num_thresholds: DEFAULT_NUM_THRESHOLDS,
            target_sum: DEFAULT_TARGET_SUM,
            gaus_stdev: DEFAULT_GAUS_STDEV,
            close_size: DEFAULT_CLOSE_SIZE,
            policy: ConvergencePolicy::default(),
        }
    }
}

impl LocalThresholdOptions {
    fn validate(&self) -> FilterResult<()> {
        if self.num_thresholds == 0 {
            return Err(FilterError::InvalidConfiguration(
                "num_thresholds must be positive".to_string(),
            ));
        }
        if !(self.target_sum > 0.0 && self.target_sum < 1.0) {
            return Err(FilterError::InvalidConfiguration(format!(
                "target_sum must lie in (0, 1), got {}",
                self.target_sum
            )));
        }
        // Even bricks have no centered origin
        if self.close_size % 2 == 0 {
            return Err(FilterError::InvalidConfiguration(format!(
                "close_size must be odd, got {}",
                self.close_size
            )));
        }
        Ok(())
    }
}

/// Summary of one thresholding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdStats {
    /// Interior blocks visited
    pub blocks_processed: usize,
    /// Blocks left at 0 because their search did not converge
    pub unconverged: Vec<BlockIndex>,
    /// Bisection steps summed over converged blocks
    pub total_iterations: u64,
    /// Largest step count of any converged block
    pub max_iterations: u32,
}

impl ThresholdStats {
    fn merge(&mut self, other: ThresholdStats) {
        self.blocks_processed += other.blocks_processed;
        self.unconverged.extend(other.unconverged);
        self.total_iterations += other.total_iterations;
        self.max_iterations = self.max_iterations.max(other.max_iterations);
    }
}

// ============================================================================
// Thresholder
// ============================================================================

/// Configured local thresholder
///
/// Owns the kernel table, so one instance can be reused across images.
#[derive(Debug, Clone)]
pub struct LocalThresholder {
    options: LocalThresholdOptions,
    table: GaussianKernelTable,
}

impl LocalThresholder {
    /// Validate `options` and build the kernel table
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for a zero iteration budget, a target outside
    /// (0, 1), a non-positive standard deviation or an even closing size.
    pub fn new(options: LocalThresholdOptions) -> FilterResult<Self> {
        options.validate()?;
        let table = GaussianKernelTable::new(options.gaus_stdev)?;
        Ok(Self { options, table })
    }

    pub fn options(&self) -> &LocalThresholdOptions {
        &self.options
    }

    pub fn kernel(&self) -> &GaussianKernelTable {
        &self.table
    }

    /// Threshold `full_res` using block statistics from `downsampled`
    ///
    /// Returns a 1 bpp mask of the full-resolution size.
    pub fn run(&self, full_res: &Pix, downsampled: &Pix) -> FilterResult<Pix> {
        self.run_with_stats(full_res, downsampled)
            .map(|(mask, _)| mask)
    }

    /// Like [`run`](Self::run), also reporting per-run statistics
    ///
    /// # Errors
    ///
    /// - `UnsupportedDepth` if either input is not 8 bpp
    /// - `InvalidScalingFactor` if the sizes are not related by one integer
    ///   factor on both axes
    /// - `ThresholdSearchDidNotConverge` under [`ConvergencePolicy::Fail`]
    pub fn run_with_stats(
        &self,
        full_res: &Pix,
        downsampled: &Pix,
    ) -> FilterResult<(Pix, ThresholdStats)> {
        for pix in [full_res, downsampled] {
            if pix.depth() != PixelDepth::Bit8 {
                return Err(FilterError::UnsupportedDepth {
                    expected: "8 bpp",
                    actual: pix.depth().bits(),
                });
            }
        }
        let scale = scaling_factor(full_res, downsampled)?;
        debug!(
            full_width = full_res.width(),
            full_height = full_res.height(),
            down_width = downsampled.width(),
            down_height = downsampled.height(),
            scale,
            num_thresholds = self.options.num_thresholds,
            target_sum = self.options.target_sum,
            gaus_stdev = self.options.gaus_stdev,
            "running local threshold"
        );

        let mut mask = Pix::new(full_res.width(), full_res.height(), PixelDepth::Bit1)?.to_mut();
        let strip_len = strip_len(scale, full_res.width());
        let rows = self.threshold_strips(full_res, downsampled, scale, mask.data_mut(), strip_len);

        // Merge in row order so the first failing block is reported
        let mut stats = ThresholdStats::default();
        for result in rows {
            stats.merge(result?);
        }
        debug!(
            blocks = stats.blocks_processed,
            unconverged = stats.unconverged.len(),
            max_iterations = stats.max_iterations,
            "block thresholds done"
        );

        let mask: Pix = mask.into();
        let mask = if self.options.close_size > 1 {
            close_safe_brick(&mask, self.options.close_size, self.options.close_size)?
        } else {
            mask
        };
        Ok((mask, stats))
    }

    /// Process every block row; entry `r` covers mask rows `[r * scale, (r + 1) * scale)`
    #[cfg(feature = "parallel")]
    fn threshold_strips(
        &self,
        full_res: &Pix,
        downsampled: &Pix,
        scale: u32,
        mask: &mut [u8],
        strip_len: usize,
    ) -> Vec<FilterResult<ThresholdStats>> {
        use rayon::prelude::*;

        mask.par_chunks_mut(strip_len)
            .enumerate()
            .map(|(row, strip)| self.threshold_row(full_res, downsampled, scale, row as u32, strip))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn threshold_strips(
        &self,
        full_res: &Pix,
        downsampled: &Pix,
        scale: u32,
        mask: &mut [u8],
        strip_len: usize,
    ) -> Vec<FilterResult<ThresholdStats>> {
        mask.chunks_mut(strip_len)
            .enumerate()
            .map(|(row, strip)| self.threshold_row(full_res, downsampled, scale, row as u32, strip))
            .collect()
    }

    /// Threshold the interior blocks of one downsampled row into its mask strip
    fn threshold_row(
        &self,
        full_res: &Pix,
        downsampled: &Pix,
        scale: u32,
        row: u32,
        strip: &mut [u8],
    ) -> FilterResult<ThresholdStats> {
        let mut stats = ThresholdStats::default();
        let (width, height) = (downsampled.width(), downsampled.height());
        if row == 0 || row + 1 >= height {
            return Ok(stats);
        }

        for col in 1..width.saturating_sub(1) {
            let block = BlockIndex::new(row, col);
            let histogram = estimate_interior(downsampled, block, &self.table);
            stats.blocks_processed += 1;

            match search_threshold(
                &histogram,
                self.options.target_sum,
                self.options.num_thresholds,
            ) {
                Ok(outcome) => {
                    trace!(
                        row,
                        col,
                        threshold = outcome.threshold,
                        iterations = outcome.iterations,
                        "block threshold"
                    );
                    stats.total_iterations += u64::from(outcome.iterations);
                    stats.max_iterations = stats.max_iterations.max(outcome.iterations);
                    fill_footprint(
                        full_res,
                        &histogram,
                        outcome.threshold,
                        block,
                        scale,
                        strip,
                        row * scale,
                    );
                }
                Err(err @ FilterError::ThresholdSearchDidNotConverge { .. })
                    if self.options.policy == ConvergencePolicy::SkipBlock =>
                {
                    warn!(row, col, error = %err, "skipping block");
                    stats.unconverged.push(block);
                }
                Err(err) => return Err(err.at_block(block)),
            }
        }
        Ok(stats)
    }
}

/// Mask bytes covered by one row of blocks
fn strip_len(scale: u32, width: u32) -> usize {
    scale as usize * width as usize
}

/// Integer ratio between full-resolution and downsampled sizes
///
/// # Errors
///
/// `InvalidScalingFactor` unless `full = s * down` on both axes for one `s >= 1`.
pub fn scaling_factor(full_res: &Pix, downsampled: &Pix) -> FilterResult<u32> {
    let (fw, fh) = (full_res.width(), full_res.height());
    let (dw, dh) = (downsampled.width(), downsampled.height());
    let invalid = || FilterError::InvalidScalingFactor {
        full_width: fw,
        full_height: fh,
        down_width: dw,
        down_height: dh,
    };

    if dw == 0 || dh == 0 || fw % dw != 0 {
        return Err(invalid());
    }
    let scale = fw / dw;
    if scale == 0 || dh.checked_mul(scale) != Some(fh) {
        return Err(invalid());
    }
    Ok(scale)
}
