//! PNM (Portable Any Map) format support
//!
//! Reads PBM (P1 ASCII, P4 binary) and PGM (P2 ASCII, P5 binary) with a
//! maxval of at most 255. Writes P4 for 1 bpp and P5 for 8 bpp images.
//! PBM stores 1 for black, which maps directly onto mask foreground.

use crate::{IoError, IoResult};
use localthresh_core::{ImageFormat, Pix, PixelDepth};
use std::io::{BufRead, Write};

/// Read a PNM image (P1/P2/P4/P5) from a reader.
///
/// # Returns
/// A `Pix` at 1 bpp (PBM) or 8 bpp (PGM).
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<Pix> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let mut header = HeaderParser::new(&bytes);

    let magic = header.token()?;
    let (binary, depth) = match magic.as_slice() {
        b"P1" => (false, PixelDepth::Bit1),
        b"P2" => (false, PixelDepth::Bit8),
        b"P4" => (true, PixelDepth::Bit1),
        b"P5" => (true, PixelDepth::Bit8),
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNM magic: {}",
                String::from_utf8_lossy(&magic)
            )));
        }
    };

    let width = header.number()?;
    let height = header.number()?;
    let maxval = match depth {
        PixelDepth::Bit1 => 1,
        PixelDepth::Bit8 => header.number()?,
    };
    if maxval == 0 || maxval > 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "PNM maxval {maxval} not supported"
        )));
    }

    let w = width as usize;
    let h = height as usize;
    let mut data = Vec::with_capacity(w * h);

    if binary {
        // Exactly one whitespace byte separates the header from the raster
        let start = header.pos + 1;
        let raster = bytes.get(start..).unwrap_or(&[]);
        match depth {
            PixelDepth::Bit1 => {
                let bytes_per_row = w.div_ceil(8);
                if raster.len() < bytes_per_row * h {
                    return Err(IoError::InvalidData("truncated PBM raster".to_string()));
                }
                for row in raster.chunks(bytes_per_row).take(h) {
                    for x in 0..w {
                        data.push((row[x / 8] >> (7 - (x % 8))) & 1);
                    }
                }
            }
            PixelDepth::Bit8 => {
                if raster.len() < w * h {
                    return Err(IoError::InvalidData("truncated PGM raster".to_string()));
                }
                data.extend_from_slice(&raster[..w * h]);
            }
        }
    } else {
        for _ in 0..w * h {
            let val = match depth {
                PixelDepth::Bit1 => header.bit()?,
                PixelDepth::Bit8 => header.number()?,
            };
            if val > maxval {
                return Err(IoError::InvalidData(format!(
                    "sample {val} exceeds maxval {maxval}"
                )));
            }
            data.push(val as u8);
        }
    }

    let pix = Pix::from_raw(width, height, depth, data)?;
    let mut pix_mut = pix.try_into_mut().unwrap_or_else(|p| p.to_mut());
    pix_mut.set_informat(ImageFormat::Pnm);
    Ok(pix_mut.into())
}

/// Write a `Pix` as binary PNM to a writer.
///
/// Chooses P4 (1 bpp) or P5 (8 bpp) based on the pixel depth.
pub fn write_pnm<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();

    match pix.depth() {
        PixelDepth::Bit1 => {
            write!(writer, "P4\n{width} {height}\n")?;
            let bytes_per_row = width.div_ceil(8) as usize;
            let mut row_bytes = vec![0u8; bytes_per_row];
            for y in 0..height {
                row_bytes.fill(0);
                for (x, &val) in pix.row_data(y).iter().enumerate() {
                    if val != 0 {
                        row_bytes[x / 8] |= 1 << (7 - (x % 8));
                    }
                }
                writer.write_all(&row_bytes)?;
            }
        }
        PixelDepth::Bit8 => {
            write!(writer, "P5\n{width} {height}\n255\n")?;
            writer.write_all(pix.data())?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Tokenizer over the PNM header and ASCII raster.
struct HeaderParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderParser<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.bytes.get(self.pos) {
                    if c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self) -> IoResult<Vec<u8>> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b'#' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(IoError::InvalidData("unexpected end of PNM data".to_string()));
        }
        Ok(self.bytes[start..self.pos].to_vec())
    }

    fn number(&mut self) -> IoResult<u32> {
        let token = self.token()?;
        std::str::from_utf8(&token)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| {
                IoError::InvalidData(format!(
                    "invalid PNM number: {}",
                    String::from_utf8_lossy(&token)
                ))
            })
    }

    /// P1 rasters may pack digits without separators.
    fn bit(&mut self) -> IoResult<u32> {
        self.skip_whitespace_and_comments();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(0)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(1)
            }
            _ => Err(IoError::InvalidData("invalid PBM sample".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pgm_roundtrip() {
        let data: Vec<u8> = (0..12).map(|i| i * 20).collect();
        let pix = Pix::from_raw(4, 3, PixelDepth::Bit8, data).unwrap();
        let mut buffer = Vec::new();
        write_pnm(&pix, &mut buffer).unwrap();
        let pix2 = read_pnm(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.depth(), PixelDepth::Bit8);
        assert_eq!(pix2.data(), pix.data());
    }

    #[test]
    fn test_pbm_roundtrip() {
        let data: Vec<u8> = (0..10 * 2).map(|i| (i % 2) as u8).collect();
        let pix = Pix::from_raw(10, 2, PixelDepth::Bit1, data).unwrap();
        let mut buffer = Vec::new();
        write_pnm(&pix, &mut buffer).unwrap();
        let pix2 = read_pnm(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.depth(), PixelDepth::Bit1);
        assert_eq!(pix2.data(), pix.data());
    }

    #[test]
    fn test_ascii_variants() {
        let pgm = b"P2\n# comment\n3 1\n255\n0 128 255\n";
        let pix = read_pnm(Cursor::new(&pgm[..])).unwrap();
        assert_eq!(pix.data(), &[0, 128, 255]);

        let pbm = b"P1\n3 2\n101\n0 1 0\n";
        let pix = read_pnm(Cursor::new(&pbm[..])).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit1);
        assert_eq!(pix.data(), &[1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_rejects_large_maxval() {
        let pgm = b"P2\n1 1\n65535\n0\n";
        assert!(read_pnm(Cursor::new(&pgm[..])).is_err());
    }

    #[test]
    fn test_truncated_raster() {
        let pgm = b"P5\n4 4\n255\n\x00\x01";
        assert!(read_pnm(Cursor::new(&pgm[..])).is_err());
    }
}
