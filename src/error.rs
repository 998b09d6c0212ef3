//! Error types shared across the capture, decode, encode, render and export paths.
//!
//! Core contracts return these precisely typed errors. Only the outermost
//! boundaries (the scan worker and the CLI) flatten them into a message.

use std::any::Any;

use crate::export::ExportFormat;
use crate::models::ECLevel;

/// Failure to turn a screen region into a [`PixelBuffer`](crate::PixelBuffer)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The bitmap reported a non-positive width or height
    #[error("Bitmap dimensions are invalid ({width}x{height})")]
    InvalidDimensions {
        /// Reported width
        width: i32,
        /// Reported height
        height: i32,
    },

    /// Pixel extraction copied no rows
    #[error("Image data conversion failed: no rows were copied")]
    ConversionFailed,

    /// The rectangle has no area once clipped to the screen
    #[error("Capture region has zero area after clipping to the screen")]
    ZeroArea,

    /// The screen backend itself failed
    #[error("Screen capture failed: {0}")]
    Backend(String),
}

/// A pixel buffer whose layout breaks the stride invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// Width or height is zero
    #[error("Pixel buffer has zero width or height")]
    ZeroDimension,

    /// Stride shorter than one row of pixels
    #[error("Stride {stride} is shorter than a row of {row_bytes} pixel bytes")]
    StrideTooSmall {
        /// Declared stride
        stride: usize,
        /// Bytes of pixel data per row
        row_bytes: usize,
    },

    /// Stride not a multiple of 4
    #[error("Stride {stride} is not aligned to 4 bytes")]
    UnalignedStride {
        /// Declared stride
        stride: usize,
    },

    /// Byte count differs from stride x height
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    LengthMismatch {
        /// stride x height
        expected: usize,
        /// Actual length
        actual: usize,
    },
}

/// Why a scan of a selected region produced no text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Capturing the region failed
    #[error("Screenshot failed: {0}")]
    Capture(#[from] CaptureError),

    /// The captured buffer cannot be handed to the decoder
    #[error("Unsupported or corrupt image buffer: {0}")]
    UnsupportedBuffer(#[from] BufferError),

    /// Decoding ran cleanly but found no symbol
    #[error(
        "No QR code found in the selected region. Make sure the capture is sharp and complete."
    )]
    NotFound,

    /// The decode library failed internally
    #[error("Recognition error: {0}")]
    Library(String),
}

/// Failure to turn text into a module matrix
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// Input exceeds the capacity of the requested level
    #[error(
        "Text is too long for error correction level {level}: {actual} bytes, maximum {max} bytes. \
         Shorten the text or choose a lower error correction level."
    )]
    TextTooLong {
        /// UTF-8 byte length of the input
        actual: usize,
        /// Capacity at `level`
        max: usize,
        /// Requested level
        level: ECLevel,
    },

    /// Encoder failed for another reason
    #[error("QR encoding failed: {0}")]
    LibraryError(String),
}

/// Failure to rasterize a module matrix
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The raster could not be allocated
    #[error("Could not allocate a {width}x{height} raster")]
    AllocationFailed {
        /// Requested width
        width: u64,
        /// Requested height
        height: u64,
    },

    /// Module scale outside the supported set
    #[error("Unsupported module scale {0}; expected one of 4, 8, 12, 16")]
    UnsupportedScale(u32),
}

/// Failure to produce a symbol from user text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// Nothing to encode
    #[error("Please enter the text to encode")]
    EmptyText,

    /// Validation or encoding failed
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Rasterization failed
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Failure while handing results to files or the clipboard
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// File extension maps to no known container
    #[error("Unsupported export format '{0}'")]
    UnsupportedFormat(String),

    /// No encoder is compiled in for the container
    #[error("No image encoder available for {0}")]
    NoEncoder(ExportFormat),

    /// Encoder reported an error
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// Filesystem error
    #[error("File write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Clipboard unavailable or rejected the data
    #[error("Clipboard operation failed: {0}")]
    Clipboard(String),
}

/// Settings persistence and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the settings file failed
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    /// Scan and generate hotkeys collide
    #[error("Hotkey {0} is already used for scanning")]
    HotkeyConflict(String),
}

/// Process singleton errors
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// Another instance holds the lock
    #[error("{name} is already running. Please check the system tray.")]
    AlreadyRunning {
        /// Lock name
        name: String,
    },

    /// Lock file could not be created
    #[error("Instance lock error: {0}")]
    Io(#[from] std::io::Error),
}

/// Message carried by a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
