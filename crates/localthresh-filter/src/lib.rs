//! localthresh-filter - Local adaptive thresholding
//!
//! This crate provides the per-block thresholding pipeline:
//!
//! - Gaussian intensity-similarity table
//! - Smoothed 3x3-neighborhood histograms from a downsampled image
//! - Bisection search for a threshold in histogram-mass space
//! - Classification of full-resolution block footprints into a binary mask
//! - [`LocalThresholder`], which runs all of the above and closes the mask
//!
//! Blocks are processed row by row in parallel when the `parallel` feature
//! is enabled (the default).

mod block;
mod error;
pub mod histogram;
pub mod kernel;
pub mod mask;
pub mod search;
pub mod threshold;

pub use block::BlockIndex;
pub use error::{FilterError, FilterResult};
pub use histogram::{SmoothedHistogram, estimate_histogram};
pub use kernel::{GaussianKernelTable, INTENSITY_LEVELS};
pub use mask::apply_mask;
pub use search::{CONVERGENCE_TOLERANCE, SearchOutcome, capped_mass, search_threshold};
pub use threshold::{
    ConvergencePolicy, LocalThresholdOptions, LocalThresholder, ThresholdStats, scaling_factor,
};
