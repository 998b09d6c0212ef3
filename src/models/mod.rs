/// Error-correction levels
pub mod ec_level;
/// Module matrix
pub mod matrix;
/// Stride-aligned RGB buffers
pub mod pixel_buffer;
/// Screen points and rectangles
pub mod rect;

pub use ec_level::ECLevel;
pub use matrix::ModuleMatrix;
pub use pixel_buffer::{PixelBuffer, PixelFormat, stride_for};
pub use rect::{Point, Rect};
