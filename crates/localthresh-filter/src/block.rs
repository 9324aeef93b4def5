//! Block addressing

use std::fmt;

/// Row and column of a cell in the downsampled image
///
/// Each cell covers a `scale x scale` footprint of the full-resolution
/// image, starting at `(col * scale, row * scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockIndex {
    pub row: u32,
    pub col: u32,
}

impl BlockIndex {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Whether the block has a full 3x3 neighborhood in a `width x height` grid
    pub fn is_interior(self, width: u32, height: u32) -> bool {
        self.row >= 1
            && self.col >= 1
            && self.row.saturating_add(1) < height
            && self.col.saturating_add(1) < width
    }
}

impl fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior() {
        assert!(BlockIndex::new(1, 1).is_interior(3, 3));
        assert!(!BlockIndex::new(0, 1).is_interior(3, 3));
        assert!(!BlockIndex::new(1, 2).is_interior(3, 3));
        assert!(!BlockIndex::new(1, 1).is_interior(2, 5));
        assert!(!BlockIndex::new(u32::MAX, 1).is_interior(u32::MAX, 3));
    }

    #[test]
    fn test_display_and_order() {
        assert_eq!(BlockIndex::new(2, 7).to_string(), "(2, 7)");
        assert!(BlockIndex::new(1, 9) < BlockIndex::new(2, 0));
    }
}
