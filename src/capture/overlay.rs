//! Overlay presentation for the region selector.
//!
//! A frame is derived entirely from [`SelectionState`]: the screen is dimmed,
//! the current rectangle is outlined in red, and text is emitted as labels
//! for the host surface to draw with its own font.

use image::{Rgba, RgbaImage};

use super::selector::SelectionState;
use crate::models::Rect;

/// Instruction shown in the top-left corner
pub const HELP_TEXT: &str = "Drag to select a region, press Esc to cancel";

/// Alpha of the black dimming layer
pub const OVERLAY_ALPHA: u8 = 128;

/// Outline thickness in pixels
pub const OUTLINE_WIDTH: i32 = 2;

/// Distance of the size label above the selection's top-left corner
pub const LABEL_OFFSET: i32 = 25;

const HELP_POSITION: (i32, i32) = (10, 10);
const DIM: Rgba<u8> = Rgba([0, 0, 0, OVERLAY_ALPHA]);
const OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Text to be drawn at a position relative to the overlay origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLabel {
    /// Label text
    pub text: String,
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
}

/// One composed overlay frame
#[derive(Debug, Clone)]
pub struct OverlayFrame {
    /// Dimmed layer with the selection outline
    pub image: RgbaImage,
    /// Help text followed by the size label, if any
    pub labels: Vec<TextLabel>,
}

/// Compose the overlay for a `width` x `height` surface whose origin is at
/// `origin` in screen coordinates.
pub fn compose(
    width: u32,
    height: u32,
    origin: (i32, i32),
    state: &SelectionState,
) -> OverlayFrame {
    let mut image = RgbaImage::from_pixel(width, height, DIM);
    let mut labels = vec![TextLabel {
        text: HELP_TEXT.to_string(),
        x: HELP_POSITION.0,
        y: HELP_POSITION.1,
    }];

    let rect = match state {
        SelectionState::Dragging { rect, .. } | SelectionState::Completed(rect) => Some(*rect),
        SelectionState::Idle | SelectionState::Cancelled => None,
    };

    if let Some(rect) = rect.filter(|r| !r.is_empty()) {
        let local = Rect::new(
            rect.left - origin.0,
            rect.top - origin.1,
            rect.right - origin.0,
            rect.bottom - origin.1,
        );
        draw_outline(&mut image, &local);
        labels.push(TextLabel {
            text: rect.size_label(),
            x: local.left,
            y: local.top - LABEL_OFFSET,
        });
    }

    OverlayFrame { image, labels }
}

fn draw_outline(image: &mut RgbaImage, rect: &Rect) {
    let bounds = Rect::new(0, 0, image.width() as i32, image.height() as i32);
    let inset = OUTLINE_WIDTH.min(rect.width() / 2).min(rect.height() / 2).max(1);
    let edges = [
        Rect::new(rect.left, rect.top, rect.right, rect.top + inset),
        Rect::new(rect.left, rect.bottom - inset, rect.right, rect.bottom),
        Rect::new(rect.left, rect.top, rect.left + inset, rect.bottom),
        Rect::new(rect.right - inset, rect.top, rect.right, rect.bottom),
    ];
    for edge in edges {
        let edge = edge.clip_to(&bounds);
        for y in edge.top..edge.bottom {
            for x in edge.left..edge.right {
                image.put_pixel(x as u32, y as u32, OUTLINE);
            }
        }
    }
}
