//! QR decoding of captured pixel buffers
//!
//! The decode collaborator is `rqrr`. This module adapts a stride-aware
//! [`PixelBuffer`] to it and spends extra effort when asked to:
//! - an inverted pass for light-on-dark symbols
//! - integer upscaled passes for small captures
//!
//! Every pass runs behind `catch_unwind`, so a fault inside the library
//! surfaces as [`DecodeOutcome::LibraryError`] instead of tearing down the
//! calling thread.

/// Tuning knobs read once from the environment
pub mod config;

use std::panic::{self, AssertUnwindSafe};

use log::{debug, log};
use rqrr::PreparedImage;

use crate::debug::diagnostic_level;
use crate::error::{ScanError, panic_message};
use crate::models::PixelBuffer;
use crate::utils::grayscale::{invert, rgb_to_grayscale, upscale_nearest};

/// Decoder effort hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeHints {
    /// Allow the slower upscaled passes
    pub try_harder: bool,
    /// Accept symbols at any orientation
    pub try_rotate: bool,
    /// Also look for light-on-dark symbols
    pub try_invert: bool,
}

impl Default for DecodeHints {
    fn default() -> Self {
        Self {
            try_harder: true,
            try_rotate: true,
            try_invert: true,
        }
    }
}

/// Tri-state decode result: never ambiguous between "nothing there" and "failed"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A symbol was decoded
    Found(String),
    /// The image decoded cleanly but contains no readable symbol
    NotFound,
    /// The decode library failed internally
    LibraryError(String),
}

impl DecodeOutcome {
    /// True for [`DecodeOutcome::Found`]
    pub fn is_found(&self) -> bool {
        matches!(self, DecodeOutcome::Found(_))
    }

    /// Decoded text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Found(text) => Some(text),
            _ => None,
        }
    }

    /// Convert into the scan error taxonomy
    pub fn into_result(self) -> Result<String, ScanError> {
        match self {
            DecodeOutcome::Found(text) => Ok(text),
            DecodeOutcome::NotFound => Err(ScanError::NotFound),
            DecodeOutcome::LibraryError(detail) => Err(ScanError::Library(detail)),
        }
    }
}

/// Decode collaborator contract
pub trait Decoder {
    /// Look for a single symbol in `buffer`
    fn decode(&self, buffer: &PixelBuffer, hints: &DecodeHints) -> DecodeOutcome;
}

/// One attempt over a transformed copy of the capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Luma as captured
    Normal,
    /// Luma inverted
    Inverted,
    /// Luma enlarged by an integer factor
    Upscaled(usize),
}

/// Passes attempted for a `width` x `height` capture, in order
pub fn plan_passes(width: usize, height: usize, hints: &DecodeHints) -> Vec<Pass> {
    let mut passes = vec![Pass::Normal];
    if hints.try_invert {
        passes.push(Pass::Inverted);
    }
    if hints.try_harder && width.min(height) < config::upscale_below() {
        passes.extend((2..=config::max_upscale()).map(Pass::Upscaled));
    }
    passes
}

/// `rqrr`-backed decoder.
///
/// `rqrr` locates symbols from their finder patterns and reads them at any
/// orientation, so `try_rotate` needs no extra pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for RqrrDecoder {
    fn decode(&self, buffer: &PixelBuffer, hints: &DecodeHints) -> DecodeOutcome {
        let (width, height) = (buffer.width(), buffer.height());
        let gray = rgb_to_grayscale(buffer);

        let mut last_error = None;
        for pass in plan_passes(width, height, hints) {
            let result = match pass {
                Pass::Normal => scan_grids(&gray, width, height),
                Pass::Inverted => scan_grids(&invert(&gray), width, height),
                Pass::Upscaled(factor) => {
                    let big = upscale_nearest(&gray, width, height, factor);
                    scan_grids(&big, width * factor, height * factor)
                }
            };

            match result {
                Ok(Some(text)) => {
                    log!(diagnostic_level(), "Decoded {} bytes on {:?} pass", text.len(), pass);
                    return DecodeOutcome::Found(text);
                }
                Ok(None) => log!(diagnostic_level(), "{:?} pass found nothing", pass),
                Err(detail) => {
                    log!(diagnostic_level(), "{:?} pass failed: {}", pass, detail);
                    last_error = Some(detail);
                }
            }
        }

        match last_error {
            Some(detail) => DecodeOutcome::LibraryError(detail),
            None => DecodeOutcome::NotFound,
        }
    }
}

/// Run `rqrr` over a packed grayscale image.
///
/// `Ok(None)` when no grid decodes; `Err` only when the library panicked.
fn scan_grids(gray: &[u8], width: usize, height: usize) -> Result<Option<String>, String> {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut prepared = PreparedImage::prepare_from_greyscale(width, height, |x, y| {
            gray[y * width + x]
        });
        let grids = prepared.detect_grids();
        for (i, grid) in grids.iter().enumerate() {
            let mut bytes = Vec::new();
            match grid.decode_to(&mut bytes) {
                Ok(meta) => {
                    debug!(
                        "Grid {} decoded: version {}, ecc {}",
                        i, meta.version.0, meta.ecc_level
                    );
                    return Some(String::from_utf8_lossy(&bytes).into_owned());
                }
                Err(e) => debug!("Grid {} of {} unreadable: {:?}", i, grids.len(), e),
            }
        }
        None
    }));
    attempt.map_err(|payload| panic_message(payload.as_ref()))
}

/// Decode with the default decoder and full-effort hints
pub fn decode_buffer(buffer: &PixelBuffer) -> DecodeOutcome {
    RqrrDecoder.decode(buffer, &DecodeHints::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark-on-light symbol drawn at `scale` pixels per module with a 4 module border
    fn symbol_buffer(text: &str, scale: usize, invert_colors: bool) -> PixelBuffer {
        let code = qrcode::QrCode::new(text.as_bytes()).unwrap();
        let n = code.width();
        let colors = code.to_colors();
        let side = (n + 8) * scale;
        let mut packed = Vec::with_capacity(side * side * 3);
        for y in 0..side {
            for x in 0..side {
                let (mx, my) = ((x / scale) as isize - 4, (y / scale) as isize - 4);
                let inside = mx >= 0 && my >= 0 && (mx as usize) < n && (my as usize) < n;
                let dark = inside && colors[my as usize * n + mx as usize] == qrcode::Color::Dark;
                let v = if dark != invert_colors { 0 } else { 255 };
                packed.extend_from_slice(&[v, v, v]);
            }
        }
        PixelBuffer::from_packed_rgb(side, side, &packed).unwrap()
    }

    #[test]
    fn test_default_hints_maximize_effort() {
        let hints = DecodeHints::default();
        assert!(hints.try_harder && hints.try_rotate && hints.try_invert);
    }

    #[test]
    fn test_plan_passes() {
        let lazy = DecodeHints {
            try_harder: false,
            try_rotate: true,
            try_invert: false,
        };
        assert_eq!(plan_passes(50, 50, &lazy), vec![Pass::Normal]);

        let full = plan_passes(50, 50, &DecodeHints::default());
        assert_eq!(full[..2], [Pass::Normal, Pass::Inverted]);
        assert!(full[2..].iter().all(|p| matches!(p, Pass::Upscaled(f) if *f >= 2)));

        let large = plan_passes(4000, 4000, &DecodeHints::default());
        assert_eq!(large, vec![Pass::Normal, Pass::Inverted]);
    }

    #[test]
    fn test_decodes_symbol() {
        let buffer = symbol_buffer("HELLO", 4, false);
        assert_eq!(decode_buffer(&buffer), DecodeOutcome::Found("HELLO".to_string()));
    }

    #[test]
    fn test_decodes_inverted_symbol() {
        let buffer = symbol_buffer("inverted", 4, true);
        assert_eq!(decode_buffer(&buffer).text(), Some("inverted"));
    }

    #[test]
    fn test_blank_buffer_is_not_found() {
        let buffer = PixelBuffer::white(123, 77).unwrap();
        assert_eq!(decode_buffer(&buffer), DecodeOutcome::NotFound);
    }

    #[test]
    fn test_outcome_into_result() {
        assert_eq!(DecodeOutcome::Found("x".into()).into_result(), Ok("x".to_string()));
        assert_eq!(DecodeOutcome::NotFound.into_result(), Err(ScanError::NotFound));
        assert_eq!(
            DecodeOutcome::LibraryError("bad".into()).into_result(),
            Err(ScanError::Library("bad".into()))
        );
    }
}
