//! Screen rectangle to [`PixelBuffer`].

use log::{debug, info};

use super::adapter::{NativeBitmap, to_pixel_buffer};
use crate::error::CaptureError;
use crate::models::{PixelBuffer, Rect};

/// Something that can blit a screen rectangle into a bitmap
pub trait ScreenSource {
    /// Bitmap type produced by [`ScreenSource::grab`]
    type Bitmap: NativeBitmap;

    /// Screen bounds in the same coordinate space as selections
    fn bounds(&self) -> Result<Rect, CaptureError>;

    /// Copy exactly `rect` (already clipped, non-empty) 1:1 into a new bitmap
    fn grab(&self, rect: Rect) -> Result<Self::Bitmap, CaptureError>;
}

/// Capture `rect` from `source` into a decoder-ready buffer.
///
/// The rectangle is clipped to the current screen bounds first; stale
/// metrics can leave nothing to capture, which is reported as
/// [`CaptureError::ZeroArea`].
pub fn capture_region<S: ScreenSource + ?Sized>(
    source: &S,
    rect: Rect,
) -> Result<PixelBuffer, CaptureError> {
    let bounds = source.bounds()?;
    let clipped = rect.clip_to(&bounds);
    if clipped.is_empty() {
        return Err(CaptureError::ZeroArea);
    }
    if clipped != rect {
        debug!("Clipped capture {:?} to {:?}", rect, clipped);
    }

    let bitmap = source.grab(clipped)?;
    let buffer = adapt_owned(bitmap)?;
    info!(
        "Captured {}x{} at ({}, {})",
        buffer.width(),
        buffer.height(),
        clipped.left,
        clipped.top
    );
    Ok(buffer)
}

/// Takes ownership so the bitmap is released here, on every path
fn adapt_owned<B: NativeBitmap>(bitmap: B) -> Result<PixelBuffer, CaptureError> {
    to_pixel_buffer(&bitmap)
}
