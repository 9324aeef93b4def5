//! localthresh-core - Basic data structures for image processing
//!
//! This crate provides the image container used throughout the
//! localthresh workspace:
//!
//! - [`Pix`] / [`PixMut`] - The image container (immutable / mutable)
//! - [`PixelDepth`] - 1 bpp binary masks and 8 bpp grayscale images
//! - [`ImageFormat`] - File formats understood by `localthresh-io`

pub mod error;
pub mod pix;

pub use error::{Error, Result};
pub use pix::convert::rgb_to_gray;
pub use pix::{ImageFormat, Pix, PixMut, PixelDepth};
