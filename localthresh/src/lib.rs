//! localthresh - Local adaptive thresholding for Rust
//!
//! Binarizes a grayscale image with a separate threshold per block. Block
//! statistics come from a downsampled copy of the same image: each block's
//! 3x3 neighborhood is turned into a Gaussian-smoothed histogram, a bisection
//! search picks a cap on histogram values, and the block's full-resolution
//! pixels are classified against it. The resulting mask is closed to fill
//! small gaps.
//!
//! # Example
//!
//! ```
//! use localthresh::{LocalThresholder, LocalThresholdOptions, Pix, PixelDepth};
//!
//! let full = Pix::from_raw(12, 12, PixelDepth::Bit8, vec![128; 144]).unwrap();
//! let down = Pix::from_raw(3, 3, PixelDepth::Bit8, vec![128; 9]).unwrap();
//!
//! let thresholder = LocalThresholder::new(LocalThresholdOptions::default()).unwrap();
//! let mask = thresholder.run(&full, &down).unwrap();
//! assert_eq!(mask.depth(), PixelDepth::Bit1);
//! assert_eq!(mask.count_pixels().unwrap(), 0);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use localthresh_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use localthresh_filter as filter;
pub use localthresh_io as io;
pub use localthresh_morph as morph;

pub use localthresh_filter::{
    ConvergencePolicy, FilterError, LocalThresholdOptions, LocalThresholder, ThresholdStats,
};
