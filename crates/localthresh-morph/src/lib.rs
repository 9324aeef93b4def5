//! localthresh-morph - Morphological operations for binary masks
//!
//! This crate provides:
//!
//! - Rectangular structuring elements (SEL)
//! - Border-preserving erosion, dilation and closing of 1 bpp masks
//!
//! The separable `*_brick` functions are what thresholding uses. The
//! `Sel`-driven forms compute the same results pixel by pixel and serve as
//! the reference the brick forms are tested against.

pub mod binary;
mod error;
pub mod sel;

pub use error::{MorphError, MorphResult};
pub use sel::Sel;

pub use binary::{close_safe, close_safe_brick, dilate, dilate_brick, erode, erode_brick};
