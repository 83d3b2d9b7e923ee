//! Visual surface abstraction
//!
//! The surface is whatever produces the content being mirrored: a headless
//! browser page, an image file, a test pattern. The refresh core only needs
//! grayscale snapshots and a census of visible content areas; how the content
//! is produced and how its changes are detected stays on the other side of
//! this trait.

use crate::Rect;
use eink_specs::Geometry;

/// Source of grayscale pixel snapshots
pub trait Surface {
    /// Lay the content out at the panel resolution
    async fn set_viewport(&mut self, geometry: Geometry) -> Result<(), SurfaceError>;

    /// Capture one byte of gray per pixel
    ///
    /// `None` captures the full frame.
    async fn capture(&mut self, region: Option<Rect>) -> Result<Frame, SurfaceError>;

    /// Count visible content areas and their fidelity tags
    async fn content_summary(&mut self) -> Result<ContentSummary, SurfaceError>;
}

/// Census of the visible content areas on the surface
///
/// Areas tagged for few-level rendering and areas tagged for full-level
/// rendering are disjoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentSummary {
    /// Visible content areas
    pub visible: usize,
    /// Visible areas tagged as fine with four gray levels
    pub force_few_level: usize,
    /// Visible areas tagged as needing sixteen gray levels
    pub force_full_level: usize,
}

impl ContentSummary {
    /// Visible areas carrying neither tag
    pub fn untagged(&self) -> usize {
        self.visible
            .saturating_sub(self.force_few_level)
            .saturating_sub(self.force_full_level)
    }
}

/// Captured grayscale pixels
///
/// One byte per pixel, row-major, `width × height` bytes. A frame is consumed
/// by quantization, which releases the buffer before the panel write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<u8>,
    rect: Rect,
}

impl Frame {
    /// Wrap captured pixels, checking the buffer covers exactly `rect`
    pub fn new(pixels: Vec<u8>, rect: Rect) -> Result<Self, SurfaceError> {
        let expected = rect.area();
        let actual = pixels.len() as u64;
        if expected != actual {
            return Err(SurfaceError::MalformedFrame { expected, actual });
        }
        Ok(Self { pixels, rect })
    }

    /// Area the pixels were captured from
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.rect.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.rect.height()
    }

    /// Borrow the gray bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take the gray bytes, dropping the frame
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// Surface errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Content not loaded or not laid out yet
    #[error("surface not ready")]
    NotReady,
    /// Snapshot failed
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    /// Snapshot size does not match the requested area
    #[error("captured {actual} pixels, expected {expected}")]
    MalformedFrame {
        /// Pixels the area holds
        expected: u64,
        /// Pixels delivered
        actual: u64,
    },
    /// Requested area is outside the surface
    #[error("region {0} outside surface")]
    OutOfBounds(Rect),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_checked() {
        let rect = Rect::new(0, 0, 4, 2).unwrap();
        assert!(Frame::new(vec![0; 8], rect).is_ok());
        assert_eq!(
            Frame::new(vec![0; 7], rect),
            Err(SurfaceError::MalformedFrame {
                expected: 8,
                actual: 7
            })
        );
    }

    #[test]
    fn test_frame_accessors() {
        let rect = Rect::new(32, 0, 36, 2).unwrap();
        let frame = Frame::new(vec![0xFF; 8], rect).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.rect(), rect);
        assert_eq!(frame.into_pixels().len(), 8);
    }

    #[test]
    fn test_untagged_count() {
        let s = ContentSummary {
            visible: 5,
            force_few_level: 2,
            force_full_level: 1,
        };
        assert_eq!(s.untagged(), 2);
        assert_eq!(ContentSummary::default().untagged(), 0);
    }
}
