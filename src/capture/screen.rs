//! Concrete [`ScreenSource`] implementations.

use image::RgbImage;

use super::adapter::DibSection;
use super::pipeline::ScreenSource;
use crate::error::CaptureError;
use crate::models::{Point, Rect};

/// A screen backed by an in-memory frame.
///
/// Blits produce bottom-up 32-bit DIBs, the same layout a GDI screen copy
/// hands back, so everything downstream of the blit runs as in production.
#[derive(Debug, Clone)]
pub struct FrameScreen {
    frame: RgbImage,
    origin: Point,
}

impl FrameScreen {
    /// Screen showing `frame` with its top-left pixel at (0, 0)
    pub fn new(frame: RgbImage) -> Self {
        Self::with_origin(frame, Point::default())
    }

    /// Screen showing `frame` with its top-left pixel at `origin`
    pub fn with_origin(frame: RgbImage, origin: Point) -> Self {
        Self { frame, origin }
    }

    /// The displayed frame
    pub fn frame(&self) -> &RgbImage {
        &self.frame
    }
}

impl ScreenSource for FrameScreen {
    type Bitmap = DibSection;

    fn bounds(&self) -> Result<Rect, CaptureError> {
        Ok(Rect::from_origin_size(
            self.origin,
            self.frame.width() as i32,
            self.frame.height() as i32,
        ))
    }

    fn grab(&self, rect: Rect) -> Result<DibSection, CaptureError> {
        let mut dib = DibSection::new(rect.width(), rect.height(), 32, false).ok_or(
            CaptureError::InvalidDimensions {
                width: rect.width(),
                height: rect.height(),
            },
        )?;
        let (x0, y0) = (rect.left - self.origin.x, rect.top - self.origin.y);
        for y in 0..rect.height() {
            for x in 0..rect.width() {
                let (sx, sy) = (x0 + x, y0 + y);
                if sx < 0 || sy < 0 {
                    continue;
                }
                if let Some(px) = self.frame.get_pixel_checked(sx as u32, sy as u32) {
                    dib.set_pixel(x as usize, y as usize, px.0);
                }
            }
        }
        Ok(dib)
    }
}

/// Pixel rectangle of `rect` inside a `frame_width` x `frame_height`
/// capture of a display whose desktop extent is `bounds`.
///
/// A display with a scale factor captures more pixels than `bounds` spans,
/// so each edge is scaled by the frame-to-bounds ratio of its axis. The
/// result is `(x, y, width, height)` clamped to the frame, or `None` when
/// nothing of `rect` lands on it.
pub fn frame_region(
    rect: Rect,
    bounds: Rect,
    frame_width: u32,
    frame_height: u32,
) -> Option<(u32, u32, u32, u32)> {
    if bounds.width() <= 0 || bounds.height() <= 0 {
        return None;
    }
    let to_frame = |edge: i32, origin: i32, extent: i32, frame: u32, round_up: bool| {
        let extent = i64::from(extent);
        let offset = (i64::from(edge) - i64::from(origin)).clamp(0, extent);
        let scaled = offset * i64::from(frame);
        let px = if round_up {
            (scaled + extent - 1) / extent
        } else {
            scaled / extent
        };
        px as u32
    };
    let left = to_frame(rect.left, bounds.left, bounds.width(), frame_width, false);
    let right = to_frame(rect.right, bounds.left, bounds.width(), frame_width, true);
    let top = to_frame(rect.top, bounds.top, bounds.height(), frame_height, false);
    let bottom = to_frame(rect.bottom, bounds.top, bounds.height(), frame_height, true);
    if right <= left || bottom <= top {
        None
    } else {
        Some((left, top, right - left, bottom - top))
    }
}

#[cfg(feature = "screen")]
pub use primary::PrimaryMonitor;

#[cfg(feature = "screen")]
mod primary {
    use image::RgbaImage;
    use log::debug;
    use xcap::Monitor;

    use super::{ScreenSource, frame_region};
    use crate::error::CaptureError;
    use crate::models::Rect;

    /// The primary display, captured through `xcap`
    pub struct PrimaryMonitor {
        monitor: Monitor,
    }

    impl PrimaryMonitor {
        /// Locate the primary monitor, falling back to the first one listed
        pub fn open() -> Result<Self, CaptureError> {
            let monitors = Monitor::all()
                .map_err(|e| CaptureError::Backend(format!("failed to enumerate monitors: {e}")))?;
            let mut fallback = None;
            for monitor in monitors {
                if monitor.is_primary().unwrap_or(false) {
                    return Ok(Self { monitor });
                }
                fallback.get_or_insert(monitor);
            }
            fallback
                .map(|monitor| Self { monitor })
                .ok_or_else(|| CaptureError::Backend("no monitor found".to_string()))
        }
    }

    fn backend<E: std::fmt::Display>(e: E) -> CaptureError {
        CaptureError::Backend(e.to_string())
    }

    impl ScreenSource for PrimaryMonitor {
        type Bitmap = RgbaImage;

        fn bounds(&self) -> Result<Rect, CaptureError> {
            let x = self.monitor.x().map_err(backend)?;
            let y = self.monitor.y().map_err(backend)?;
            let width = self.monitor.width().map_err(backend)?;
            let height = self.monitor.height().map_err(backend)?;
            Ok(Rect::new(x, y, x + width as i32, y + height as i32))
        }

        fn grab(&self, rect: Rect) -> Result<RgbaImage, CaptureError> {
            let bounds = self.bounds()?;
            let full = self.monitor.capture_image().map_err(backend)?;
            let (x, y, width, height) = frame_region(rect, bounds, full.width(), full.height())
                .ok_or(CaptureError::ZeroArea)?;
            debug!(
                "Monitor frame {}x{}, taking {}x{} at ({}, {})",
                full.width(),
                full.height(),
                width,
                height,
                x,
                y
            );
            Ok(image::imageops::crop_imm(&full, x, y, width, height).to_image())
        }
    }
}
