//! screen_qr - read QR codes off the screen and make new ones
//!
//! Two pipelines share this crate:
//! - scan: select a screen region, capture it into a stride-aligned RGB
//!   [`PixelBuffer`], decode it with `rqrr`
//! - generate: check text against the capacity table, encode it with
//!   `qrcode`, render export and preview rasters, export or copy them
//!
//! Screen access, the clipboard and the decoder sit behind traits so both
//! pipelines run headless in tests.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Region selection, screen sources and the bitmap adapter
pub mod capture;
/// Persistent settings and hotkeys
pub mod config;
mod debug;
/// QR decoding of captured pixel buffers
pub mod decoder;
/// Capacity checks and text to matrix encoding
pub mod encoder;
/// Error taxonomy
pub mod error;
/// File export and clipboard payloads
pub mod export;
/// Process singleton
pub mod instance;
/// Core data structures (PixelBuffer, Rect, ModuleMatrix, ECLevel)
pub mod models;
/// Matrix rasterization and the generated-symbol workspace
pub mod render;
/// Scan pipeline and the single-flight coordinator
pub mod scan;
/// Helpers shared by the CLI and benches
pub mod tools;
/// Utility functions (grayscale, inversion, upscaling)
pub mod utils;

pub use decoder::{DecodeHints, DecodeOutcome, Decoder, RqrrDecoder, decode_buffer};
pub use encoder::{CAPACITY_TABLE, EncodeRequest, Encoder, QrcodeEncoder, encode_text};
pub use error::{
    CaptureError, ConfigError, EncodeError, ExportError, GenerateError, InstanceError, RenderError,
    ScanError,
};
pub use models::{ECLevel, ModuleMatrix, PixelBuffer, Point, Rect, stride_for};
pub use render::{ModuleScale, RenderOptions, RenderedSymbol, SymbolWorkspace};
pub use scan::{ScanCoordinator, ScanPipeline, ScanReport};

/// Decode the first QR code in a stride-aligned RGB image
///
/// # Arguments
/// * `data` - Raw RGB bytes, `stride` bytes per row
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `stride` - Row stride in bytes, a multiple of 4 of at least `width * 3`
pub fn decode_rgb(
    data: &[u8],
    width: usize,
    height: usize,
    stride: usize,
) -> Result<String, ScanError> {
    let buffer = PixelBuffer::new(width, height, stride, data.to_vec())?;
    decode_buffer(&buffer).into_result()
}

/// Encode `text` at `level` and render both rasters
pub fn generate(
    text: &str,
    level: ECLevel,
    options: RenderOptions,
) -> Result<RenderedSymbol, GenerateError> {
    if text.is_empty() {
        return Err(GenerateError::EmptyText);
    }
    let matrix = encode_text(text, level)?;
    Ok(RenderedSymbol::render(matrix, level, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BufferError;

    #[test]
    fn test_generate_then_decode_rgb() {
        let symbol = generate("lib round trip", ECLevel::Q, RenderOptions::default()).unwrap();
        let buffer = PixelBuffer::from_packed_rgb(
            symbol.export.width() as usize,
            symbol.export.height() as usize,
            symbol.export.as_raw(),
        )
        .unwrap();
        let (w, h, stride) = (buffer.width(), buffer.height(), buffer.stride());
        let decoded = decode_rgb(buffer.as_bytes(), w, h, stride);
        assert_eq!(decoded, Ok("lib round trip".to_string()));
    }

    #[test]
    fn test_decode_rgb_rejects_bad_layout() {
        let result = decode_rgb(&[0; 12], 2, 2, 6);
        assert_eq!(
            result,
            Err(ScanError::UnsupportedBuffer(BufferError::UnalignedStride { stride: 6 }))
        );
    }

    #[test]
    fn test_generate_rejects_empty_text() {
        assert!(matches!(
            generate("", ECLevel::M, RenderOptions::default()),
            Err(GenerateError::EmptyText)
        ));
    }
}
