use crate::error::BufferError;

/// Bytes per pixel for the only supported layout (packed 24-bit RGB)
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// Row stride for a 24-bit RGB row of `width` pixels, padded to a 4-byte boundary.
///
/// `stride_for(w) == ceil(w * 3 / 4) * 4`
pub fn stride_for(width: usize) -> usize {
    (width * RGB_BYTES_PER_PIXEL).div_ceil(4) * 4
}

/// Pixel layout of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 bytes per pixel, R then G then B
    Rgb24,
}

impl PixelFormat {
    /// Bytes used by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb24 => RGB_BYTES_PER_PIXEL,
        }
    }
}

/// Row-major, top-down RGB pixel buffer with an explicit row stride.
///
/// Row `r` occupies `data[r * stride .. r * stride + width * 3]`; anything after
/// that inside the row is alignment padding and is never read as pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw bytes, checking the layout invariants.
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension);
        }
        let row_bytes = width * RGB_BYTES_PER_PIXEL;
        if stride < row_bytes {
            return Err(BufferError::StrideTooSmall { stride, row_bytes });
        }
        if stride % 4 != 0 {
            return Err(BufferError::UnalignedStride { stride });
        }
        let expected = stride * height;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            format: PixelFormat::Rgb24,
            data,
        })
    }

    /// White buffer with the canonical stride for `width`
    pub fn white(width: usize, height: usize) -> Result<Self, BufferError> {
        let stride = stride_for(width);
        Self::new(width, height, stride, vec![255; stride * height])
    }

    /// Pack tightly-packed RGB rows (as produced by `image::RgbImage::into_raw`)
    /// into a buffer with the canonical padded stride.
    pub fn from_packed_rgb(
        width: usize,
        height: usize,
        packed: &[u8],
    ) -> Result<Self, BufferError> {
        let row_bytes = width * RGB_BYTES_PER_PIXEL;
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension);
        }
        if packed.len() != row_bytes * height {
            return Err(BufferError::LengthMismatch {
                expected: row_bytes * height,
                actual: packed.len(),
            });
        }
        let stride = stride_for(width);
        let mut data = vec![0u8; stride * height];
        for (dst, src) in data.chunks_exact_mut(stride).zip(packed.chunks_exact(row_bytes)) {
            dst[..row_bytes].copy_from_slice(src);
        }
        Self::new(width, height, stride, data)
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes from the start of one row to the start of the next
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw bytes including row padding
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel bytes of row `r`, padding excluded
    pub fn row(&self, r: usize) -> &[u8] {
        let start = r * self.stride;
        &self.data[start..start + self.width * RGB_BYTES_PER_PIXEL]
    }

    /// Iterate rows top to bottom, padding excluded
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let row_bytes = self.width * RGB_BYTES_PER_PIXEL;
        self.data
            .chunks_exact(self.stride)
            .map(move |row| &row[..row_bytes])
    }

    /// RGB triple at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = y * self.stride + x * RGB_BYTES_PER_PIXEL;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Drop the padding and return tightly packed RGB rows
    pub fn to_packed_rgb(&self) -> Vec<u8> {
        let mut packed = Vec::with_capacity(self.width * self.height * RGB_BYTES_PER_PIXEL);
        for row in self.rows() {
            packed.extend_from_slice(row);
        }
        packed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_known_widths() {
        assert_eq!(stride_for(1), 4);
        assert_eq!(stride_for(4), 12);
        assert_eq!(stride_for(5), 16);
        assert_eq!(stride_for(21), 64);
        assert_eq!(stride_for(1920), 5760);
    }

    #[test]
    fn test_stride_all_widths() {
        for w in 1..=4096 {
            let s = stride_for(w);
            assert_eq!(s % 4, 0, "width {}", w);
            assert!(s >= w * 3, "width {}", w);
            assert!(s - w * 3 < 4, "width {}", w);
        }
    }

    #[test]
    fn test_rows_skip_padding() {
        // 5 px wide -> 15 pixel bytes + 1 padding byte per row
        let mut data = vec![0u8; 16 * 2];
        data[15] = 0xAA;
        data[16] = 7;
        let buf = PixelBuffer::new(5, 2, 16, data).unwrap();
        assert_eq!(buf.row(0).len(), 15);
        assert!(!buf.row(0).contains(&0xAA));
        assert_eq!(buf.row(1)[0], 7);
        assert_eq!(buf.rows().count(), 2);
    }

    #[test]
    fn test_rejects_bad_layouts() {
        assert!(matches!(
            PixelBuffer::new(0, 4, 4, vec![]),
            Err(BufferError::ZeroDimension)
        ));
        assert!(matches!(
            PixelBuffer::new(5, 1, 15, vec![0; 15]),
            Err(BufferError::UnalignedStride { .. })
        ));
        assert!(matches!(
            PixelBuffer::new(5, 1, 12, vec![0; 12]),
            Err(BufferError::StrideTooSmall { .. })
        ));
        assert!(matches!(
            PixelBuffer::new(5, 2, 16, vec![0; 16]),
            Err(BufferError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_packed_round_trip() {
        let packed: Vec<u8> = (0..(7 * 3 * 3) as u8).collect();
        let buf = PixelBuffer::from_packed_rgb(7, 3, &packed).unwrap();
        assert_eq!(buf.stride(), 24);
        assert_eq!(buf.pixel(1, 1), [24, 25, 26]);
        assert_eq!(buf.to_packed_rgb(), packed);
    }
}
