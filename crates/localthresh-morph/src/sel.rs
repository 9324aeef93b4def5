//! Structuring element (SEL) for morphological operations
//!
//! Only rectangular SELs are needed for mask cleanup. The general
//! offset-driven operations in [`crate::binary`] take a `Sel`; the
//! separable `*_brick` functions are their fast equivalents.

use crate::{MorphError, MorphResult};

/// Rectangular structuring element
///
/// Every position is a hit. The origin (cx, cy) sits at
/// (`width / 2`, `height / 2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sel {
    width: u32,
    height: u32,
    cx: u32,
    cy: u32,
}

impl Sel {
    /// Create a `width` x `height` brick
    pub fn create_brick(width: u32, height: u32) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel(format!(
                "SEL dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
        })
    }

    pub fn create_square(size: u32) -> MorphResult<Self> {
        Self::create_brick(size, size)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn origin_x(&self) -> u32 {
        self.cx
    }

    #[inline]
    pub fn origin_y(&self) -> u32 {
        self.cy
    }

    /// Number of hits
    pub fn hit_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Hit positions relative to the origin, in row-major order
    pub fn hit_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let cx = self.cx as i32;
        let cy = self.cy as i32;
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| (x - cx, y - cy)))
    }
}
