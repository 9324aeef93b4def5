//! Binary morphological operations
//!
//! Erosion, dilation and closing for 1-bpp images, each with a general
//! [`Sel`] form and a separable brick form.
//!
//! Dilation treats pixels outside the image as OFF. Erosion ignores them,
//! so closing never removes foreground that touches the border: every ON
//! pixel of the input stays ON (closing is extensive).
//!
//! Dilation reflects the SEL about its origin and erosion does not, which
//! makes closing the true adjoint pair for every size. For odd sizes the
//! reflection is the identity.

use crate::{MorphError, MorphResult, Sel};
use localthresh_core::{Pix, PixelDepth};

/// Dilate a binary image
///
/// For each hit (dx, dy) of the SEL: dest(x, y) |= src(x - dx, y - dy).
pub fn dilate(pix: &Pix, sel: &Sel) -> MorphResult<Pix> {
    check_binary(pix)?;
    let w = pix.width() as i32;
    let h = pix.height() as i32;
    let src = pix.data();
    let hits: Vec<_> = sel.hit_offsets().collect();

    let mut out = pix.create_template().to_mut();
    let dst = out.data_mut();
    for y in 0..h {
        for x in 0..w {
            let on = hits.iter().any(|&(dx, dy)| {
                let sx = x - dx;
                let sy = y - dy;
                sx >= 0 && sx < w && sy >= 0 && sy < h && src[(sy * w + sx) as usize] != 0
            });
            dst[(y * w + x) as usize] = u8::from(on);
        }
    }
    Ok(out.into())
}

/// Erode a binary image
///
/// For each hit (dx, dy) of the SEL: dest(x, y) &= src(x + dx, y + dy),
/// skipping hits that fall outside the image.
pub fn erode(pix: &Pix, sel: &Sel) -> MorphResult<Pix> {
    check_binary(pix)?;
    let w = pix.width() as i32;
    let h = pix.height() as i32;
    let src = pix.data();
    let hits: Vec<_> = sel.hit_offsets().collect();

    let mut out = pix.create_template().to_mut();
    let dst = out.data_mut();
    for y in 0..h {
        for x in 0..w {
            let on = hits.iter().all(|&(dx, dy)| {
                let sx = x + dx;
                let sy = y + dy;
                sx < 0 || sx >= w || sy < 0 || sy >= h || src[(sy * w + sx) as usize] != 0
            });
            dst[(y * w + x) as usize] = u8::from(on);
        }
    }
    Ok(out.into())
}

/// Close a binary image without eroding foreground at the image border
pub fn close_safe(pix: &Pix, sel: &Sel) -> MorphResult<Pix> {
    let dilated = dilate(pix, sel)?;
    erode(&dilated, sel)
}

/// Dilate with a brick (rectangular) structuring element
///
/// Separable: a horizontal pass followed by a vertical pass, each a
/// running-window OR computed from prefix counts.
pub fn dilate_brick(pix: &Pix, width: u32, height: u32) -> MorphResult<Pix> {
    check_brick(pix, width, height)?;
    if width == 1 && height == 1 {
        return Ok(pix.clone());
    }
    let tmp = brick_pass(pix, width, true, Pass::Dilate)?;
    brick_pass(&tmp, height, false, Pass::Dilate)
}

/// Erode with a brick structuring element
pub fn erode_brick(pix: &Pix, width: u32, height: u32) -> MorphResult<Pix> {
    check_brick(pix, width, height)?;
    if width == 1 && height == 1 {
        return Ok(pix.clone());
    }
    let tmp = brick_pass(pix, width, true, Pass::Erode)?;
    brick_pass(&tmp, height, false, Pass::Erode)
}

/// Close with a brick structuring element, preserving border foreground
pub fn close_safe_brick(pix: &Pix, width: u32, height: u32) -> MorphResult<Pix> {
    let dilated = dilate_brick(pix, width, height)?;
    erode_brick(&dilated, width, height)
}

#[derive(Clone, Copy)]
enum Pass {
    Dilate,
    Erode,
}

/// One separable pass of a brick operation along rows or columns.
///
/// The origin of a brick of `size` sits at `size / 2`, matching
/// [`Sel::create_brick`].
fn brick_pass(pix: &Pix, size: u32, horizontal: bool, pass: Pass) -> MorphResult<Pix> {
    if size == 1 {
        return Ok(pix.clone());
    }
    let w = pix.width() as usize;
    let h = pix.height() as usize;
    let (n_lines, line_len) = if horizontal { (h, w) } else { (w, h) };
    let index = |line: usize, i: usize| {
        if horizontal {
            line * w + i
        } else {
            i * w + line
        }
    };

    let c = (size / 2) as usize;
    let size = size as usize;
    // Window is [i - before, i + after]
    let (before, after) = match pass {
        Pass::Dilate => (size - 1 - c, c),
        Pass::Erode => (c, size - 1 - c),
    };

    let src = pix.data();
    let mut out = pix.create_template().to_mut();
    let dst = out.data_mut();
    let mut prefix = vec![0u32; line_len + 1];

    for line in 0..n_lines {
        for i in 0..line_len {
            prefix[i + 1] = prefix[i] + u32::from(src[index(line, i)] != 0);
        }
        for i in 0..line_len {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(line_len - 1);
            let count = prefix[hi + 1] - prefix[lo];
            let on = match pass {
                Pass::Dilate => count > 0,
                // Only in-image pixels of the window must be ON
                Pass::Erode => count == (hi - lo + 1) as u32,
            };
            dst[index(line, i)] = u8::from(on);
        }
    }
    Ok(out.into())
}

fn check_brick(pix: &Pix, width: u32, height: u32) -> MorphResult<()> {
    check_binary(pix)?;
    if width == 0 || height == 0 {
        return Err(MorphError::InvalidParameters(format!(
            "brick dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

fn check_binary(pix: &Pix) -> MorphResult<()> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(MorphError::UnsupportedDepth {
            expected: "1 bpp",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_binary(w: u32, h: u32, on: &[(u32, u32)]) -> Pix {
        let mut pm = Pix::new(w, h, PixelDepth::Bit1).unwrap().to_mut();
        for &(x, y) in on {
            pm.set_pixel(x, y, 1).unwrap();
        }
        pm.into()
    }

    #[test]
    fn test_dilate_single_pixel() {
        let pix = make_binary(5, 5, &[(2, 2)]);
        let sel = Sel::create_square(3).unwrap();
        let out = dilate(&pix, &sel).unwrap();
        assert_eq!(out.count_pixels().unwrap(), 9);
        assert_eq!(out.get_pixel(1, 1), Some(1));
        assert_eq!(out.get_pixel(0, 0), Some(0));
    }

    #[test]
    fn test_erode_ignores_outside_pixels() {
        let full = Pix::from_raw(4, 4, PixelDepth::Bit1, vec![1; 16]).unwrap();
        let sel = Sel::create_square(3).unwrap();
        assert_eq!(erode(&full, &sel).unwrap().count_pixels().unwrap(), 16);
        assert_eq!(erode_brick(&full, 3, 3).unwrap().count_pixels().unwrap(), 16);

        // A hole removes its whole 3x3 neighborhood
        let mut data = vec![1; 25];
        data[12] = 0;
        let holed = Pix::from_raw(5, 5, PixelDepth::Bit1, data).unwrap();
        assert_eq!(erode(&holed, &sel).unwrap().count_pixels().unwrap(), 16);
    }

    #[test]
    fn test_close_fills_gap() {
        let pix = make_binary(7, 3, &[(1, 1), (2, 1), (4, 1), (5, 1)]);
        let closed = close_safe_brick(&pix, 3, 3).unwrap();
        assert_eq!(closed.get_pixel(3, 1), Some(1));
    }

    #[test]
    fn test_close_safe_keeps_border_pixel() {
        let pix = make_binary(5, 5, &[(0, 0)]);
        let safe = close_safe_brick(&pix, 3, 3).unwrap();
        assert_eq!(safe.get_pixel(0, 0), Some(1));
        assert_eq!(safe.count_pixels().unwrap(), 1);
    }

    #[test]
    fn test_brick_matches_sel() {
        let on: Vec<_> = (0..60u32)
            .filter(|i| (i * 7 + 3) % 5 < 2)
            .map(|i| (i % 12, i / 12))
            .collect();
        let pix = make_binary(12, 5, &on);
        for (w, h) in [(3, 3), (2, 3), (4, 1), (1, 5)] {
            let sel = Sel::create_brick(w, h).unwrap();
            assert_eq!(
                dilate_brick(&pix, w, h).unwrap().data(),
                dilate(&pix, &sel).unwrap().data()
            );
            assert_eq!(
                erode_brick(&pix, w, h).unwrap().data(),
                erode(&pix, &sel).unwrap().data()
            );
            assert_eq!(
                close_safe_brick(&pix, w, h).unwrap().data(),
                close_safe(&pix, &sel).unwrap().data()
            );
        }
    }

    #[test]
    fn test_rejects_gray_and_zero_brick() {
        let gray = Pix::new(3, 3, PixelDepth::Bit8).unwrap();
        assert!(dilate_brick(&gray, 3, 3).is_err());
        let bin = Pix::new(3, 3, PixelDepth::Bit1).unwrap();
        assert!(close_safe_brick(&bin, 0, 3).is_err());
    }
}
