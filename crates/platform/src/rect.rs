//! Half-open rectangles in device pixel space

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

/// Rejection reasons for rectangle construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RectError {
    /// Zero width or zero height: no visible change
    #[error("degenerate rectangle ({left},{top})-({right},{bottom})")]
    Degenerate {
        /// Left edge
        left: u32,
        /// Top edge
        top: u32,
        /// Right edge (exclusive)
        right: u32,
        /// Bottom edge (exclusive)
        bottom: u32,
    },
    /// Origin plus size does not fit in `u32`
    #[error("rectangle extent overflows")]
    Overflow,
}

/// Half-open box `[left, right) × [top, bottom)`
///
/// Invariant: `left < right` and `top < bottom`. The only way to build one is
/// through a validating constructor, so zero-area rectangles never reach the
/// region math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl Rect {
    /// Build from edges, rejecting zero-area input
    ///
    /// # Examples
    /// ```
    /// # use platform::Rect;
    /// assert!(Rect::new(0, 0, 40, 40).is_ok());
    /// assert!(Rect::new(0, 0, 0, 10).is_err());
    /// ```
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Result<Self, RectError> {
        if left >= right || top >= bottom {
            return Err(RectError::Degenerate {
                left,
                top,
                right,
                bottom,
            });
        }
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Build from an origin and a size
    pub fn from_origin_size(x: u32, y: u32, width: u32, height: u32) -> Result<Self, RectError> {
        let right = x.checked_add(width).ok_or(RectError::Overflow)?;
        let bottom = y.checked_add(height).ok_or(RectError::Overflow)?;
        Self::new(x, y, right, bottom)
    }

    /// Left edge (inclusive)
    pub const fn left(&self) -> u32 {
        self.left
    }

    /// Top edge (inclusive)
    pub const fn top(&self) -> u32 {
        self.top
    }

    /// Right edge (exclusive)
    pub const fn right(&self) -> u32 {
        self.right
    }

    /// Bottom edge (exclusive)
    pub const fn bottom(&self) -> u32 {
        self.bottom
    }

    /// Width in pixels (never zero)
    // SAFETY: right > left by construction.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Height in pixels (never zero)
    // SAFETY: bottom > top by construction.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Pixel count
    pub const fn area(&self) -> u64 {
        (self.width() as u64).saturating_mul(self.height() as u64)
    }

    /// True if `other` lies entirely inside `self`
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// True if the two rectangles share at least one pixel
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

impl core::fmt::Display for Rect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

// Coordinates beyond i32::MAX saturate; no panel comes close.
impl From<Rect> for Rectangle {
    fn from(rect: Rect) -> Self {
        let x = i32::try_from(rect.left).unwrap_or(i32::MAX);
        let y = i32::try_from(rect.top).unwrap_or(i32::MAX);
        Rectangle::new(Point::new(x, y), Size::new(rect.width(), rect.height()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_width() {
        assert_eq!(
            Rect::new(0, 0, 0, 10),
            Err(RectError::Degenerate {
                left: 0,
                top: 0,
                right: 0,
                bottom: 10
            })
        );
    }

    #[test]
    fn test_rejects_inverted() {
        assert!(Rect::new(10, 0, 5, 10).is_err());
        assert!(Rect::new(0, 10, 10, 10).is_err());
    }

    #[test]
    fn test_dimensions() {
        let r = Rect::new(8, 16, 40, 24).unwrap();
        assert_eq!(r.width(), 32);
        assert_eq!(r.height(), 8);
        assert_eq!(r.area(), 256);
    }

    #[test]
    fn test_from_origin_size() {
        let r = Rect::from_origin_size(32, 64, 100, 50).unwrap();
        assert_eq!(r, Rect::new(32, 64, 132, 114).unwrap());
        assert_eq!(
            Rect::from_origin_size(u32::MAX, 0, 2, 2),
            Err(RectError::Overflow)
        );
        assert!(Rect::from_origin_size(0, 0, 0, 2).is_err());
    }

    #[test]
    fn test_contains_and_intersects() {
        let outer = Rect::new(0, 0, 64, 64).unwrap();
        let inner = Rect::new(10, 10, 20, 20).unwrap();
        let apart = Rect::new(64, 0, 80, 10).unwrap();
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
        assert!(outer.intersects(&inner));
        assert!(!outer.intersects(&apart));
    }

    #[test]
    fn test_into_rectangle() {
        let r = Rect::new(5, 6, 15, 26).unwrap();
        let eg: Rectangle = r.into();
        assert_eq!(eg.top_left, Point::new(5, 6));
        assert_eq!(eg.size, Size::new(10, 20));
    }
}
