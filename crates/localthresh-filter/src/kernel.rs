//! Gaussian intensity-similarity table
//!
//! Entry `K[j][i] = exp(-0.5 * ((i - j) / sigma)^2)` is the weight that a
//! pixel of intensity `j` contributes to histogram bin `i`. The table is
//! built once per thresholder and then only read.

use crate::{FilterError, FilterResult};

/// Number of intensity levels in an 8 bpp image
pub const INTENSITY_LEVELS: usize = 256;

/// Precomputed 256x256 Gaussian weights over intensity differences
#[derive(Debug, Clone)]
pub struct GaussianKernelTable {
    sigma: f64,
    weights: Vec<[f64; INTENSITY_LEVELS]>,
    row_sums: [f64; INTENSITY_LEVELS],
}

impl GaussianKernelTable {
    /// Build the table for standard deviation `sigma` (in intensity units)
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `sigma` is not a finite positive number.
    pub fn new(sigma: f64) -> FilterResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(FilterError::InvalidConfiguration(format!(
                "gaussian standard deviation must be finite and positive, got {sigma}"
            )));
        }

        let mut weights = vec![[0.0; INTENSITY_LEVELS]; INTENSITY_LEVELS];
        let mut row_sums = [0.0; INTENSITY_LEVELS];
        for (j, row) in weights.iter_mut().enumerate() {
            for (i, w) in row.iter_mut().enumerate() {
                let d = (i as f64 - j as f64) / sigma;
                *w = (-0.5 * d * d).exp();
            }
            row_sums[j] = row.iter().sum();
        }

        Ok(Self {
            sigma,
            weights,
            row_sums,
        })
    }

    /// Standard deviation the table was built with
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Weight between intensities `j` and `i`
    #[inline]
    pub fn weight(&self, j: u8, i: u8) -> f64 {
        self.weights[j as usize][i as usize]
    }

    /// Full row of weights for source intensity `j`
    #[inline]
    pub fn row(&self, j: u8) -> &[f64; INTENSITY_LEVELS] {
        &self.weights[j as usize]
    }

    /// Sum of row `j`
    ///
    /// Rows near the ends of the intensity range are truncated by the
    /// table edge, so this varies with `j`.
    #[inline]
    pub fn row_sum(&self, j: u8) -> f64 {
        self.row_sums[j as usize]
    }
}
