//! Text to module matrix
//!
//! Requests are validated against [`CapacityTable`] before the encode
//! collaborator (`qrcode`) runs, so oversize input is reported with its
//! actual length, the limit and the level instead of a generic failure.

/// Byte capacity per error-correction level
pub mod capacity;

pub use capacity::{CAPACITY_TABLE, CapacityTable};

use log::debug;
use qrcode::{Color, EcLevel, QrCode};

use crate::error::EncodeError;
use crate::models::{ECLevel, ModuleMatrix};

/// Validated text and level, ready for the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeRequest<'a> {
    text: &'a str,
    level: ECLevel,
}

impl<'a> EncodeRequest<'a> {
    /// Check `text` against the capacity of `level`
    pub fn build(text: &'a str, level: ECLevel) -> Result<Self, EncodeError> {
        let actual = text.len();
        let max = CAPACITY_TABLE.max_bytes(level);
        if actual > max {
            return Err(EncodeError::TextTooLong { actual, max, level });
        }
        Ok(Self { text, level })
    }

    /// Text, unchanged
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Requested level, unchanged
    pub fn level(&self) -> ECLevel {
        self.level
    }
}

/// Encode collaborator contract
pub trait Encoder {
    /// Produce the module matrix for a validated request
    fn encode(&self, request: &EncodeRequest<'_>) -> Result<ModuleMatrix, EncodeError>;
}

/// Encoder backed by the `qrcode` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct QrcodeEncoder;

fn to_qrcode_level(level: ECLevel) -> EcLevel {
    match level {
        ECLevel::L => EcLevel::L,
        ECLevel::M => EcLevel::M,
        ECLevel::Q => EcLevel::Q,
        ECLevel::H => EcLevel::H,
    }
}

impl Encoder for QrcodeEncoder {
    fn encode(&self, request: &EncodeRequest<'_>) -> Result<ModuleMatrix, EncodeError> {
        let level = to_qrcode_level(request.level());
        let code = QrCode::with_error_correction_level(request.text(), level)
            .map_err(|e| EncodeError::LibraryError(e.to_string()))?;
        let size = code.width();
        let colors = code.to_colors();
        debug!(
            "Encoded {} bytes at {} into {}x{} modules",
            request.text().len(),
            request.level().letter(),
            size,
            size
        );
        Ok(ModuleMatrix::from_fn(size, |x, y| colors[y * size + x] == Color::Dark))
    }
}

/// Validate and encode with the default encoder
pub fn encode_text(text: &str, level: ECLevel) -> Result<ModuleMatrix, EncodeError> {
    let request = EncodeRequest::build(text, level)?;
    QrcodeEncoder.encode(&request)
}
