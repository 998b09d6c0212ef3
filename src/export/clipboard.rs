//! Clipboard payloads and sinks.
//!
//! Text travels as UTF-16 code units with a trailing NUL and rasters as an
//! uncompressed 24-bit device-independent bitmap, the formats a native
//! clipboard expects. Rasters also travel as RGBA with the white
//! background keyed out to alpha 0.

use image::{RgbImage, RgbaImage};
#[cfg(feature = "clipboard")]
use log::debug;

use crate::capture::adapter::DibSection;
use crate::error::ExportError;
use crate::render::color_keyed;

/// Size of a `BITMAPINFOHEADER`
pub const BITMAP_INFO_HEADER_SIZE: usize = 40;

/// Destination for clipboard data
pub trait ClipboardSink {
    /// Replace the clipboard contents with `text`
    fn set_text(&mut self, text: &str) -> Result<(), ExportError>;

    /// Replace the clipboard contents with `raster`
    fn set_image(&mut self, raster: &RgbImage) -> Result<(), ExportError>;
}

/// UTF-16 code units of `text` followed by a NUL terminator
pub fn utf16_with_nul(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// RGBA clipboard image: white background transparent, modules opaque
pub fn clipboard_rgba(raster: &RgbImage) -> RgbaImage {
    color_keyed(raster)
}

/// Packed DIB: `BITMAPINFOHEADER` then bottom-up BGR rows padded to 4 bytes
pub fn encode_dib(raster: &RgbImage) -> Vec<u8> {
    let (width, height) = raster.dimensions();
    let stride = DibSection::row_stride(width as usize, 24);
    let image_size = stride * height as usize;

    let mut dib = Vec::with_capacity(BITMAP_INFO_HEADER_SIZE + image_size);
    dib.extend_from_slice(&(BITMAP_INFO_HEADER_SIZE as u32).to_le_bytes());
    dib.extend_from_slice(&(width as i32).to_le_bytes());
    // positive height: bottom-up rows
    dib.extend_from_slice(&(height as i32).to_le_bytes());
    dib.extend_from_slice(&1u16.to_le_bytes());
    dib.extend_from_slice(&24u16.to_le_bytes());
    // BI_RGB
    dib.extend_from_slice(&0u32.to_le_bytes());
    dib.extend_from_slice(&(image_size as u32).to_le_bytes());
    // resolution and palette fields
    dib.extend_from_slice(&[0u8; 16]);

    let row_bytes = width as usize * 3;
    if row_bytes == 0 {
        return dib;
    }
    for row in raster.as_raw().chunks_exact(row_bytes).rev() {
        for px in row.chunks_exact(3) {
            dib.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        dib.extend(std::iter::repeat_n(0u8, stride - row_bytes));
    }
    dib
}

/// Clipboard kept in memory, holding the native payloads
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryClipboard {
    /// Last text payload
    pub text: Option<Vec<u16>>,
    /// Last image payload
    pub dib: Option<Vec<u8>>,
    /// Colour-keyed RGBA form of the last image
    pub rgba: Option<RgbaImage>,
}

impl MemoryClipboard {
    /// Empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Text payload decoded back to a `String`, without the terminator
    pub fn text_string(&self) -> Option<String> {
        self.text.as_ref().map(|units| {
            let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
            String::from_utf16_lossy(&units[..end])
        })
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
        self.dib = None;
        self.rgba = None;
        self.text = Some(utf16_with_nul(text));
        Ok(())
    }

    fn set_image(&mut self, raster: &RgbImage) -> Result<(), ExportError> {
        self.text = None;
        self.dib = Some(encode_dib(raster));
        self.rgba = Some(clipboard_rgba(raster));
        Ok(())
    }
}

/// The system clipboard through `arboard`
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    /// Open the system clipboard
    pub fn new() -> Result<Self, ExportError> {
        let inner = arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "clipboard")]
impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
        self.inner
            .set_text(text)
            .map_err(|e| ExportError::Clipboard(e.to_string()))?;
        debug!("Copied {} characters to the clipboard", text.chars().count());
        Ok(())
    }

    fn set_image(&mut self, raster: &RgbImage) -> Result<(), ExportError> {
        let rgba = clipboard_rgba(raster);
        let (width, height) = rgba.dimensions();
        let image_data = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: std::borrow::Cow::Owned(rgba.into_raw()),
        };
        self.inner
            .set_image(image_data)
            .map_err(|e| ExportError::Clipboard(e.to_string()))?;
        debug!("Copied {}x{} image to the clipboard", width, height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_utf16_payload() {
        assert_eq!(utf16_with_nul("Hi"), vec![0x48, 0x69, 0]);
        // astral plane character becomes a surrogate pair
        assert_eq!(utf16_with_nul("😀"), vec![0xD83D, 0xDE00, 0]);
    }

    #[test]
    fn test_dib_layout() {
        // 5 px wide: 15 pixel bytes padded to 16
        let mut raster = RgbImage::from_pixel(5, 2, Rgb([255, 255, 255]));
        raster.put_pixel(0, 0, Rgb([1, 2, 3]));
        let dib = encode_dib(&raster);

        assert_eq!(dib.len(), BITMAP_INFO_HEADER_SIZE + 32);
        assert_eq!(u32::from_le_bytes(dib[0..4].try_into().unwrap()), 40);
        assert_eq!(i32::from_le_bytes(dib[4..8].try_into().unwrap()), 5);
        assert_eq!(i32::from_le_bytes(dib[8..12].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(dib[14..16].try_into().unwrap()), 24);
        assert_eq!(u32::from_le_bytes(dib[20..24].try_into().unwrap()), 32);

        // top row is stored last, as BGR
        let last_row = &dib[BITMAP_INFO_HEADER_SIZE + 16..];
        assert_eq!(&last_row[..3], &[3, 2, 1]);
        assert_eq!(last_row[15], 0);
    }

    #[test]
    fn test_memory_clipboard_replaces_contents() {
        let mut clipboard = MemoryClipboard::new();
        clipboard.set_text("héllo").unwrap();
        assert_eq!(clipboard.text_string().as_deref(), Some("héllo"));

        clipboard.set_image(&RgbImage::new(4, 4)).unwrap();
        assert!(clipboard.text.is_none());
        assert!(clipboard.dib.is_some());

        clipboard.set_text("again").unwrap();
        assert!(clipboard.dib.is_none() && clipboard.rgba.is_none());
    }

    #[test]
    fn test_image_payload_keys_out_background() {
        let symbol = crate::generate(
            "keyed",
            crate::ECLevel::M,
            crate::RenderOptions::with_scale(crate::ModuleScale::X4),
        )
        .unwrap();
        let mut clipboard = MemoryClipboard::new();
        clipboard.set_image(&symbol.export).unwrap();

        let rgba = clipboard.rgba.as_ref().unwrap();
        assert_eq!(rgba.dimensions(), symbol.export.dimensions());
        // quiet zone corner, then the top-left finder pattern
        assert_eq!(rgba.get_pixel(0, 0).0, [255, 255, 255, 0]);
        assert_eq!(rgba.get_pixel(16, 16).0, [0, 0, 0, 255]);
        for (keyed, px) in rgba.pixels().zip(symbol.export.pixels()) {
            let expected = if px.0 == [255, 255, 255] { 0 } else { 255 };
            assert_eq!(keyed.0[3], expected);
        }
    }
}
