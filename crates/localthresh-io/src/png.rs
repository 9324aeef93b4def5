//! PNG image format support
//!
//! Reading always yields a single-channel image: 1-bit grayscale PNGs
//! become 1 bpp masks, every other layout is reduced to 8 bpp gray
//! (color via BT.601 luma, alpha discarded, 16-bit samples keep the
//! high byte, 2/4-bit gray is rescaled to the full 8-bit range).

use crate::{IoError, IoResult};
use localthresh_core::{Pix, PixelDepth, rgb_to_gray};
use png::{BitDepth, ColorType, Decoder, Encoder};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let decoder = Decoder::new(reader);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;
    let palette: Option<Vec<u8>> = info.palette.as_ref().map(|p| p.to_vec());

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let w = width as usize;
    let mut out = Vec::with_capacity(w * height as usize);

    let depth = match (color_type, bit_depth) {
        (ColorType::Grayscale, BitDepth::One) => {
            for row in data.chunks(bytes_per_row).take(height as usize) {
                for x in 0..w {
                    out.push((row[x / 8] >> (7 - (x % 8))) & 1);
                }
            }
            PixelDepth::Bit1
        }
        (ColorType::Grayscale, BitDepth::Two | BitDepth::Four)
        | (ColorType::Indexed, BitDepth::One | BitDepth::Two | BitDepth::Four | BitDepth::Eight) => {
            let bits = bit_depth as usize;
            let mask = ((1u16 << bits) - 1) as u8;
            let per_byte = 8 / bits;
            let lut = match color_type {
                ColorType::Indexed => {
                    let palette = palette.as_ref().ok_or_else(|| {
                        IoError::InvalidData("indexed PNG without palette".to_string())
                    })?;
                    palette_to_gray(palette)
                }
                _ => (0..=mask as u16)
                    .map(|v| (v * 255 / mask as u16) as u8)
                    .collect(),
            };
            for row in data.chunks(bytes_per_row).take(height as usize) {
                for x in 0..w {
                    let shift = 8 - bits * (x % per_byte + 1);
                    let idx = (row[x / per_byte] >> shift) & mask;
                    let val = lut.get(idx as usize).copied().ok_or_else(|| {
                        IoError::InvalidData(format!("palette index {idx} out of range"))
                    })?;
                    out.push(val);
                }
            }
            PixelDepth::Bit8
        }
        (ColorType::Grayscale, BitDepth::Eight | BitDepth::Sixteen)
        | (ColorType::GrayscaleAlpha, _)
        | (ColorType::Rgb, _)
        | (ColorType::Rgba, _) => {
            let channels = color_type.samples();
            let sample_bytes = if bit_depth == BitDepth::Sixteen { 2 } else { 1 };
            let stride = channels * sample_bytes;
            for row in data.chunks(bytes_per_row).take(height as usize) {
                for x in 0..w {
                    let px = &row[x * stride..(x + 1) * stride];
                    // Big-endian 16-bit samples: the first byte is the high byte.
                    let sample = |c: usize| px[c * sample_bytes];
                    let val = match color_type {
                        ColorType::Rgb | ColorType::Rgba => {
                            rgb_to_gray(sample(0), sample(1), sample(2))
                        }
                        _ => sample(0),
                    };
                    out.push(val);
                }
            }
            PixelDepth::Bit8
        }
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG format: {:?} {:?}",
                color_type, bit_depth
            )));
        }
    };

    let pix = Pix::from_raw(width, height, depth, out)?;
    let mut pix_mut = pix.try_into_mut().unwrap_or_else(|p| p.to_mut());
    pix_mut.set_informat(localthresh_core::ImageFormat::Png);
    Ok(pix_mut.into())
}

fn palette_to_gray(palette: &[u8]) -> Vec<u8> {
    palette
        .chunks_exact(3)
        .map(|c| rgb_to_gray(c[0], c[1], c[2]))
        .collect()
}

/// Write a PNG image
///
/// 1 bpp images are written as 1-bit grayscale, 8 bpp as 8-bit grayscale.
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();

    let bit_depth = match pix.depth() {
        PixelDepth::Bit1 => BitDepth::One,
        PixelDepth::Bit8 => BitDepth::Eight,
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(ColorType::Grayscale);
    encoder.set_depth(bit_depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let data = match pix.depth() {
        PixelDepth::Bit8 => pix.data().to_vec(),
        PixelDepth::Bit1 => {
            let bytes_per_row = width.div_ceil(8) as usize;
            let mut data = vec![0u8; bytes_per_row * height as usize];
            for y in 0..height {
                let row_start = y as usize * bytes_per_row;
                for (x, &val) in pix.row_data(y).iter().enumerate() {
                    if val != 0 {
                        data[row_start + x / 8] |= 1 << (7 - (x % 8));
                    }
                }
            }
            data
        }
    };

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_png_roundtrip_grayscale() {
        let pix = Pix::new(10, 10, PixelDepth::Bit8).unwrap();
        let mut pix_mut = pix.try_into_mut().unwrap();

        for y in 0..10 {
            for x in 0..10 {
                pix_mut.set_pixel(x, y, (x + y) * 10).unwrap();
            }
        }

        let pix: Pix = pix_mut.into();

        let mut buffer = Vec::new();
        write_png(&pix, &mut buffer).unwrap();

        let pix2 = read_png(Cursor::new(buffer)).unwrap();

        assert_eq!(pix2.width(), 10);
        assert_eq!(pix2.height(), 10);
        assert_eq!(pix2.depth(), PixelDepth::Bit8);
        assert_eq!(pix2.data(), pix.data());
    }

    #[test]
    fn test_png_binary_mask_keeps_depth() {
        // Width 11 exercises a partially filled last byte per row
        let data: Vec<u8> = (0..11 * 3).map(|i| (i % 3 == 0) as u8).collect();
        let pix = Pix::from_raw(11, 3, PixelDepth::Bit1, data).unwrap();

        let mut buffer = Vec::new();
        write_png(&pix, &mut buffer).unwrap();
        let pix2 = read_png(Cursor::new(buffer)).unwrap();

        assert_eq!(pix2.depth(), PixelDepth::Bit1);
        assert_eq!(pix2.data(), pix.data());
    }

    #[test]
    fn test_png_rgb_reduced_to_gray() {
        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, 2, 1);
            encoder.set_color(ColorType::Rgb);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&[255, 255, 255, 0, 0, 0])
                .unwrap();
        }
        let pix = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        assert_eq!(pix.data(), &[255, 0]);
    }
}
