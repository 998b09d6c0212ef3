//! Stride-aware RGB to luminance conversion
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
//!
//! Rows are addressed through the buffer's stride so padding bytes at the end
//! of each row are never treated as pixels.

use crate::models::PixelBuffer;
use crate::models::pixel_buffer::RGB_BYTES_PER_PIXEL;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline(always)]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert a [`PixelBuffer`] to a tightly packed grayscale image (width x height bytes)
pub fn rgb_to_grayscale(buffer: &PixelBuffer) -> Vec<u8> {
    rgb_rows_to_grayscale(
        buffer.as_bytes(),
        buffer.width(),
        buffer.height(),
        buffer.stride(),
    )
}

/// Convert raw RGB rows with an explicit stride to grayscale
///
/// `data` must hold at least `stride * (height - 1) + width * 3` bytes and
/// `stride` must cover a row. Anything else, or a zero dimension, yields an
/// empty vector.
pub fn rgb_rows_to_grayscale(data: &[u8], width: usize, height: usize, stride: usize) -> Vec<u8> {
    let row_bytes = width * RGB_BYTES_PER_PIXEL;
    if width == 0 || height == 0 || stride < row_bytes {
        return Vec::new();
    }
    let required = stride
        .checked_mul(height - 1)
        .and_then(|n| n.checked_add(row_bytes));
    if required.is_none_or(|n| data.len() < n) {
        return Vec::new();
    }

    let mut gray = vec![0u8; width * height];
    for (y, out) in gray.chunks_exact_mut(width).enumerate() {
        let start = y * stride;
        row_to_grayscale(&data[start..start + row_bytes], out);
    }
    gray
}

/// Scalar row conversion with manual 8x unrolling
fn row_to_grayscale(row: &[u8], out: &mut [u8]) {
    let mut chunks = row.chunks_exact(8 * RGB_BYTES_PER_PIXEL);
    let mut out_chunks = out.chunks_exact_mut(8);
    for (px, dst) in (&mut chunks).zip(&mut out_chunks) {
        for j in 0..8 {
            let i = j * RGB_BYTES_PER_PIXEL;
            dst[j] = luma(px[i], px[i + 1], px[i + 2]);
        }
    }

    // Remaining pixels
    let tail = chunks.remainder();
    let tail_out = out_chunks.into_remainder();
    for (px, dst) in tail.chunks_exact(RGB_BYTES_PER_PIXEL).zip(tail_out.iter_mut()) {
        *dst = luma(px[0], px[1], px[2]);
    }
}

/// Invert luminance (light-on-dark symbols become dark-on-light)
pub fn invert(gray: &[u8]) -> Vec<u8> {
    gray.iter().map(|&v| 255 - v).collect()
}

/// Enlarge a grayscale image by an integer factor without interpolation
pub fn upscale_nearest(gray: &[u8], width: usize, height: usize, factor: usize) -> Vec<u8> {
    let new_width = width * factor;
    let mut out = Vec::with_capacity(new_width * height * factor);
    for row in gray.chunks_exact(width).take(height) {
        let start = out.len();
        for &v in row {
            out.extend(std::iter::repeat_n(v, factor));
        }
        for _ in 1..factor {
            out.extend_from_within(start..start + new_width);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_conversion() {
        // 2x2 image: red, green, blue, white
        let rgb = vec![
            255, 0, 0, // Red
            0, 255, 0, // Green
            0, 0, 255, // Blue
            255, 255, 255, // White
        ];
        let buf = PixelBuffer::from_packed_rgb(2, 2, &rgb).unwrap();
        let gray = rgb_to_grayscale(&buf);

        assert_eq!(gray.len(), 4);
        assert!(gray[0] > 70 && gray[0] < 80);
        assert!(gray[1] > 145 && gray[1] < 155);
        assert!(gray[2] > 25 && gray[2] < 35);
        assert!(gray[3] > 250);
    }

    #[test]
    fn test_padding_is_ignored() {
        // 3 px wide rows: 9 pixel bytes + 3 padding bytes filled with black
        let mut data = vec![0u8; 12 * 2];
        for row in data.chunks_exact_mut(12) {
            row[..9].fill(255);
        }
        let gray = rgb_rows_to_grayscale(&data, 3, 2, 12);
        assert_eq!(gray, vec![255; 6]);
    }

    #[test]
    fn test_bad_row_layout_yields_nothing() {
        let data = vec![255u8; 24];
        assert!(rgb_rows_to_grayscale(&data, 0, 2, 12).is_empty());
        assert!(rgb_rows_to_grayscale(&data, 3, 0, 12).is_empty());
        // stride shorter than a row
        assert!(rgb_rows_to_grayscale(&data, 3, 2, 8).is_empty());
        // second row would end past the data
        assert!(rgb_rows_to_grayscale(&data[..20], 3, 2, 12).is_empty());
        // last row needs no padding
        assert_eq!(rgb_rows_to_grayscale(&data[..21], 3, 2, 12).len(), 6);
    }

    #[test]
    fn test_long_rows_match_scalar() {
        let width = 19;
        let packed: Vec<u8> = (0..width * 3).map(|i| (i * 13 % 256) as u8).collect();
        let buf = PixelBuffer::from_packed_rgb(width, 1, &packed).unwrap();
        let gray = rgb_to_grayscale(&buf);
        for (x, px) in packed.chunks_exact(3).enumerate() {
            assert_eq!(gray[x], luma(px[0], px[1], px[2]));
        }
    }

    #[test]
    fn test_upscale_and_invert() {
        let gray = vec![0, 255];
        let up = upscale_nearest(&gray, 2, 1, 2);
        assert_eq!(up, vec![0, 0, 255, 255, 0, 0, 255, 255]);
        assert_eq!(invert(&gray), vec![255, 0]);
    }
}
