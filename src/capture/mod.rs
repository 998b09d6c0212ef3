//! Region selection and screen capture
//!
//! - [`selector`]: drag-to-select state machine
//! - [`overlay`]: presentation of the selector state
//! - [`pipeline`]: clip, blit and adapt a rectangle
//! - [`adapter`]: native bitmap to stride-correct [`PixelBuffer`](crate::PixelBuffer)
//! - [`screen`]: concrete screen sources

pub mod adapter;
pub mod overlay;
pub mod pipeline;
pub mod screen;
pub mod selector;

pub use adapter::{DibSection, NativeBitmap, to_pixel_buffer};
pub use pipeline::{ScreenSource, capture_region};
pub use screen::FrameScreen;
#[cfg(feature = "screen")]
pub use screen::PrimaryMonitor;
pub use selector::{RegionSelector, SelectionOutcome, SelectionState, SelectorEvent, run_selection};
