//! Handing results to files and the clipboard
//!
//! File export goes through the `image` codecs. When no name is supplied
//! one is derived from the local time.

pub mod clipboard;

pub use clipboard::{ClipboardSink, MemoryClipboard, encode_dib, utf16_with_nul};
#[cfg(feature = "clipboard")]
pub use clipboard::SystemClipboard;

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use image::{DynamicImage, ImageError, ImageFormat, RgbImage};
use log::info;

use crate::error::ExportError;

/// Container formats a raster can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    /// Lossless, the default
    #[default]
    Png,
    /// Baseline JPEG
    Jpeg,
}

impl ExportFormat {
    /// Format for a file extension, case-insensitive
    pub fn from_extension(ext: &str) -> Result<Self, ExportError> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Format implied by a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&ext)
    }

    /// Preferred file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => f.write_str("PNG"),
            ExportFormat::Jpeg => f.write_str("JPEG"),
        }
    }
}

fn map_image_error(err: ImageError, format: ExportFormat) -> ExportError {
    match err {
        ImageError::Unsupported(_) => ExportError::NoEncoder(format),
        ImageError::IoError(e) => ExportError::Io(e),
        other => ExportError::Encode(other.to_string()),
    }
}

/// Encode `raster` into an in-memory file of the given format
pub fn encode_raster(raster: &RgbImage, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(raster.clone())
        .write_to(&mut bytes, format.image_format())
        .map_err(|e| map_image_error(e, format))?;
    Ok(bytes.into_inner())
}

/// Write `raster` to `path` as `format`.
///
/// The file is only created once encoding has succeeded.
pub fn export_raster(
    raster: &RgbImage,
    path: &Path,
    format: ExportFormat,
) -> Result<(), ExportError> {
    let bytes = encode_raster(raster, format)?;
    fs::write(path, &bytes)?;
    info!(
        "Exported {}x{} {} to {} ({} bytes)",
        raster.width(),
        raster.height(),
        format,
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// Write `raster` to `path`, choosing the format from its extension
pub fn save_raster(raster: &RgbImage, path: &Path) -> Result<ExportFormat, ExportError> {
    let format = ExportFormat::from_path(path)?;
    export_raster(raster, path, format)?;
    Ok(format)
}

/// `qrcode_<YYYYmmdd_HHMMSS>.<ext>` for the given time
pub fn file_name_at(format: ExportFormat, at: &NaiveDateTime) -> String {
    format!("qrcode_{}.{}", at.format("%Y%m%d_%H%M%S"), format.extension())
}

/// Timestamped default file name for an export made now
pub fn default_file_name(format: ExportFormat) -> String {
    file_name_at(format, &Local::now().naive_local())
}

/// Default export path inside `dir`
pub fn default_export_path(dir: &Path, format: ExportFormat) -> PathBuf {
    dir.join(default_file_name(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
    use tempfile::tempdir;

    fn sample() -> RgbImage {
        RgbImage::from_fn(24, 24, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_extension("PNG").unwrap(), ExportFormat::Png);
        assert_eq!(ExportFormat::from_extension("jpeg").unwrap(), ExportFormat::Jpeg);
        assert_eq!(
            ExportFormat::from_path(Path::new("out/code.JPG")).unwrap(),
            ExportFormat::Jpeg
        );
        assert!(matches!(
            ExportFormat::from_extension("gif"),
            Err(ExportError::UnsupportedFormat(ext)) if ext == "gif"
        ));
        assert!(matches!(
            ExportFormat::from_path(Path::new("noext")),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let raster = sample();
        let bytes = encode_raster(&raster, ExportFormat::Png).unwrap();
        let back = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(back, raster);
    }

    #[test]
    fn test_jpeg_has_magic() {
        let bytes = encode_raster(&sample(), ExportFormat::Jpeg).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_unsupported_codec_is_no_encoder() {
        let hint = ImageFormatHint::Exact(ImageFormat::Jpeg);
        let err = ImageError::Unsupported(UnsupportedError::from_format_and_kind(
            hint.clone(),
            UnsupportedErrorKind::Format(hint),
        ));
        assert!(matches!(
            map_image_error(err, ExportFormat::Jpeg),
            ExportError::NoEncoder(ExportFormat::Jpeg)
        ));
    }

    #[test]
    fn test_default_file_name() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 30)
            .unwrap();
        assert_eq!(file_name_at(ExportFormat::Png, &at), "qrcode_20240309_070530.png");
        assert_eq!(file_name_at(ExportFormat::Jpeg, &at), "qrcode_20240309_070530.jpg");
        assert!(default_file_name(ExportFormat::Png).starts_with("qrcode_"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("code.png");
        assert_eq!(save_raster(&sample(), &path).unwrap(), ExportFormat::Png);
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}
