//! Bitmap to [`PixelBuffer`] conversion.
//!
//! Whatever the native bitmap's own row layout (bottom-up, BGRA, 32-bit
//! aligned rows), the output is always top-down 24-bit RGB with
//! `stride = ceil(width * 3 / 4) * 4`.

use image::{RgbImage, RgbaImage};
use log::{debug, warn};

use crate::error::CaptureError;
use crate::models::pixel_buffer::RGB_BYTES_PER_PIXEL;
use crate::models::{PixelBuffer, stride_for};

/// A bitmap owned by a capture backend.
///
/// Mirrors the native extraction call: the bitmap writes its rows into a
/// caller-supplied buffer and reports how many rows it copied.
pub trait NativeBitmap {
    /// Width in pixels as reported by the backend
    fn width(&self) -> i32;

    /// Height in pixels as reported by the backend
    fn height(&self) -> i32;

    /// Copy rows top-down as 24-bit RGB into `dst`, starting each row at
    /// `row * stride`. Returns the number of rows copied.
    fn copy_rgb_rows(&self, dst: &mut [u8], stride: usize) -> usize;
}

/// Convert a native bitmap into a decoder-ready [`PixelBuffer`].
pub fn to_pixel_buffer<B: NativeBitmap + ?Sized>(bitmap: &B) -> Result<PixelBuffer, CaptureError> {
    let (w, h) = (bitmap.width(), bitmap.height());
    if w <= 0 || h <= 0 {
        return Err(CaptureError::InvalidDimensions {
            width: w,
            height: h,
        });
    }

    let (width, height) = (w as usize, h as usize);
    let stride = stride_for(width);
    let mut data = vec![0u8; stride * height];

    let rows = bitmap.copy_rgb_rows(&mut data, stride);
    if rows == 0 {
        return Err(CaptureError::ConversionFailed);
    }
    if rows < height {
        warn!("Bitmap copied {} of {} rows; remaining rows are black", rows, height);
    }

    debug!(
        "Converted {}x{} bitmap, stride {} ({} padding bytes per row)",
        width,
        height,
        stride,
        stride - width * RGB_BYTES_PER_PIXEL
    );

    PixelBuffer::new(width, height, stride, data).map_err(|_| CaptureError::ConversionFailed)
}

/// Device-independent bitmap as produced by a screen blit: BGR(A) samples,
/// rows aligned to 32 bits, stored bottom-up unless created top-down.
#[derive(Debug, Clone)]
pub struct DibSection {
    width: i32,
    height: i32,
    bits_per_pixel: u16,
    top_down: bool,
    stride: usize,
    bits: Vec<u8>,
}

impl DibSection {
    /// Allocate a black DIB. `bits_per_pixel` must be 24 or 32.
    pub fn new(width: i32, height: i32, bits_per_pixel: u16, top_down: bool) -> Option<Self> {
        if width <= 0 || height <= 0 || !matches!(bits_per_pixel, 24 | 32) {
            return None;
        }
        let stride = Self::row_stride(width as usize, bits_per_pixel);
        Some(Self {
            width,
            height,
            bits_per_pixel,
            top_down,
            stride,
            bits: vec![0; stride * height as usize],
        })
    }

    /// Row size in bytes: `((width * bpp + 31) / 32) * 4`
    pub fn row_stride(width: usize, bits_per_pixel: u16) -> usize {
        (width * bits_per_pixel as usize).div_ceil(32) * 4
    }

    /// Copy an RGB image into a new DIB with the given layout
    pub fn from_rgb_image(image: &RgbImage, bits_per_pixel: u16, top_down: bool) -> Option<Self> {
        let mut dib = Self::new(
            image.width() as i32,
            image.height() as i32,
            bits_per_pixel,
            top_down,
        )?;
        for (x, y, px) in image.enumerate_pixels() {
            dib.set_pixel(x as usize, y as usize, px.0);
        }
        Some(dib)
    }

    /// Bytes per stored row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bits per stored pixel
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Raw stored bits, native row order
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    fn storage_row(&self, y: usize) -> usize {
        if self.top_down {
            y
        } else {
            self.height as usize - 1 - y
        }
    }

    /// Write an RGB pixel at screen position (x, y), y counted from the top
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x >= self.width as usize || y >= self.height as usize {
            return;
        }
        let bpp = self.bits_per_pixel as usize / 8;
        let i = self.storage_row(y) * self.stride + x * bpp;
        self.bits[i] = rgb[2];
        self.bits[i + 1] = rgb[1];
        self.bits[i + 2] = rgb[0];
        if bpp == 4 {
            self.bits[i + 3] = 0xFF;
        }
    }
}

impl NativeBitmap for DibSection {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn copy_rgb_rows(&self, dst: &mut [u8], stride: usize) -> usize {
        let width = self.width as usize;
        let bpp = self.bits_per_pixel as usize / 8;
        let mut copied = 0;
        for y in 0..self.height as usize {
            let Some(out) = dst.get_mut(y * stride..y * stride + width * RGB_BYTES_PER_PIXEL) else {
                break;
            };
            let src_start = self.storage_row(y) * self.stride;
            let src = &self.bits[src_start..src_start + width * bpp];
            for (px, rgb) in src.chunks_exact(bpp).zip(out.chunks_exact_mut(RGB_BYTES_PER_PIXEL)) {
                // BGR(A) -> RGB
                rgb[0] = px[2];
                rgb[1] = px[1];
                rgb[2] = px[0];
            }
            copied += 1;
        }
        copied
    }
}

impl NativeBitmap for RgbaImage {
    fn width(&self) -> i32 {
        i32::try_from(self.dimensions().0).unwrap_or(-1)
    }

    fn height(&self) -> i32 {
        i32::try_from(self.dimensions().1).unwrap_or(-1)
    }

    fn copy_rgb_rows(&self, dst: &mut [u8], stride: usize) -> usize {
        let width = self.dimensions().0 as usize;
        if width == 0 {
            return 0;
        }
        let mut copied = 0;
        for (y, row) in self.as_raw().chunks_exact(width * 4).enumerate() {
            let Some(out) = dst.get_mut(y * stride..y * stride + width * RGB_BYTES_PER_PIXEL) else {
                break;
            };
            for (px, rgb) in row.chunks_exact(4).zip(out.chunks_exact_mut(RGB_BYTES_PER_PIXEL)) {
                rgb.copy_from_slice(&px[..3]);
            }
            copied += 1;
        }
        copied
    }
}

impl NativeBitmap for RgbImage {
    fn width(&self) -> i32 {
        i32::try_from(self.dimensions().0).unwrap_or(-1)
    }

    fn height(&self) -> i32 {
        i32::try_from(self.dimensions().1).unwrap_or(-1)
    }

    fn copy_rgb_rows(&self, dst: &mut [u8], stride: usize) -> usize {
        let row_bytes = self.dimensions().0 as usize * RGB_BYTES_PER_PIXEL;
        if row_bytes == 0 {
            return 0;
        }
        let mut copied = 0;
        for (y, row) in self.as_raw().chunks_exact(row_bytes).enumerate() {
            let Some(out) = dst.get_mut(y * stride..y * stride + row_bytes) else {
                break;
            };
            out.copy_from_slice(row);
            copied += 1;
        }
        copied
    }
}
