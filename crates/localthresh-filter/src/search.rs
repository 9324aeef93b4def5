//! Bisection search for a block threshold
//!
//! The threshold lives in histogram-value space, not intensity space: it is
//! the cap `t` for which `sum_k min(h[k], t)` reaches the target mass.

use crate::histogram::SmoothedHistogram;
use crate::{FilterError, FilterResult};

/// Capped-mass distance at which the search stops
pub const CONVERGENCE_TOLERANCE: f64 = 1e-3;

/// Result of a converged threshold search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Cap on histogram values, in `[0, max(histogram)]`
    pub threshold: f64,
    /// Bisection steps taken, including the final one
    pub iterations: u32,
    /// Capped mass at `threshold`
    pub capped_mass: f64,
}

/// Total histogram mass with every bin clamped to at most `cap`
pub fn capped_mass(histogram: &SmoothedHistogram, cap: f64) -> f64 {
    histogram.bins().iter().map(|&h| h.min(cap)).sum()
}

/// Find the cap whose capped mass is within tolerance of `target_mass`
///
/// Starts from the middle of `[0, max(histogram)]` and halves the interval
/// on each step for at most `max_iterations` steps.
///
/// # Errors
///
/// `ThresholdSearchDidNotConverge` if the budget runs out; the error carries
/// the last candidate and its capped mass. The block is left unset.
pub fn search_threshold(
    histogram: &SmoothedHistogram,
    target_mass: f64,
    max_iterations: u32,
) -> FilterResult<SearchOutcome> {
    let mut lo = 0.0;
    let mut hi = histogram.max();
    let mut t = (hi - lo) / 2.0;
    let mut tried = t;
    let mut mass = f64::NAN;

    for step in 1..=max_iterations {
        tried = t;
        mass = capped_mass(histogram, t);
        if (mass - target_mass).abs() < CONVERGENCE_TOLERANCE {
            return Ok(SearchOutcome {
                threshold: t,
                iterations: step,
                capped_mass: mass,
            });
        }
        if mass > target_mass {
            hi = t;
            t = (lo + t) / 2.0;
        } else {
            lo = t;
            t = (hi + t) / 2.0;
        }
    }

    Err(FilterError::ThresholdSearchDidNotConverge {
        block: None,
        iterations: max_iterations,
        threshold: tried,
        capped_mass: mass,
    })
}
