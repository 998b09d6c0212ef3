/// Integer point in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Smallest width or height a selection may have before it is considered degenerate
pub const MIN_SELECTION_EDGE: i32 = 10;

/// Screen rectangle with inclusive-exclusive bounds (`right - left` is the width)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge
    pub right: i32,
    /// Bottom edge
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its bounds, normalizing so left <= right and top <= bottom
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    /// Rectangle at `origin` with the given size
    pub fn from_origin_size(origin: Point, width: i32, height: i32) -> Self {
        Self::new(origin.x, origin.y, origin.x + width, origin.y + height)
    }

    /// Zero-area rectangle at `p`
    pub fn at_point(p: Point) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// Normalized bounding box of two points
    pub fn spanning(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// Width in pixels
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height in pixels
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Top-left corner
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// True when either edge is shorter than [`MIN_SELECTION_EDGE`]
    pub fn is_degenerate(&self) -> bool {
        self.width() < MIN_SELECTION_EDGE || self.height() < MIN_SELECTION_EDGE
    }

    /// True when the rectangle encloses no pixels
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Intersection with `bounds`; empty (zero-area) when they do not overlap
    pub fn clip_to(&self, bounds: &Rect) -> Rect {
        let left = self.left.max(bounds.left);
        let top = self.top.max(bounds.top);
        let right = self.right.min(bounds.right).max(left);
        let bottom = self.bottom.min(bounds.bottom).max(top);
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// "W x H" label shown while dragging
    pub fn size_label(&self) -> String {
        format!("{} x {}", self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_bounds() {
        let r = Rect::new(50, 40, 10, 5);
        assert_eq!(r, Rect::new(10, 5, 50, 40));
        assert_eq!(r.width(), 40);
        assert_eq!(r.height(), 35);
    }

    #[test]
    fn test_degenerate() {
        assert!(Rect::new(0, 0, 9, 100).is_degenerate());
        assert!(Rect::new(0, 0, 100, 9).is_degenerate());
        assert!(!Rect::new(0, 0, 10, 10).is_degenerate());
    }

    #[test]
    fn test_clip() {
        let screen = Rect::new(0, 0, 100, 80);
        assert_eq!(Rect::new(-10, -10, 20, 20).clip_to(&screen), Rect::new(0, 0, 20, 20));
        assert_eq!(Rect::new(90, 70, 150, 150).clip_to(&screen), Rect::new(90, 70, 100, 80));
        assert!(Rect::new(200, 200, 300, 300).clip_to(&screen).is_empty());
    }

    #[test]
    fn test_size_label() {
        assert_eq!(Rect::new(10, 10, 130, 60).size_label(), "120 x 50");
    }
}
