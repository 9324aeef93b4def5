//! Error types for localthresh-filter

use crate::BlockIndex;
use thiserror::Error;

/// Errors that can occur during local thresholding
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] localthresh_core::Error),

    /// Morphology error from the closing step
    #[error("morphology error: {0}")]
    Morph(#[from] localthresh_morph::MorphError),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth {
        /// Expected depth description
        expected: &'static str,
        /// Actual depth in bits
        actual: u32,
    },

    /// Full-resolution and downsampled sizes are not related by one integer factor
    #[error(
        "invalid scaling factor: {full_width}x{full_height} is not an integer multiple of {down_width}x{down_height} on both axes"
    )]
    InvalidScalingFactor {
        full_width: u32,
        full_height: u32,
        down_width: u32,
        down_height: u32,
    },

    /// Rejected thresholder configuration
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Bisection exhausted its iteration budget
    #[error(
        "threshold search did not converge{} after {iterations} iterations (threshold {threshold}, capped mass {capped_mass})",
        describe_block(.block)
    )]
    ThresholdSearchDidNotConverge {
        /// Block being processed, when known
        block: Option<BlockIndex>,
        iterations: u32,
        /// Last candidate threshold
        threshold: f64,
        /// Capped mass at the last candidate
        capped_mass: f64,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl FilterError {
    /// Attach a block index to a non-convergence error
    pub fn at_block(self, index: BlockIndex) -> Self {
        match self {
            Self::ThresholdSearchDidNotConverge {
                iterations,
                threshold,
                capped_mass,
                ..
            } => Self::ThresholdSearchDidNotConverge {
                block: Some(index),
                iterations,
                threshold,
                capped_mass,
            },
            other => other,
        }
    }
}

fn describe_block(block: &Option<BlockIndex>) -> String {
    block.map(|b| format!(" for block {b}")).unwrap_or_default()
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
