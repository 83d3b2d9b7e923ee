//! Panel memory as Gray4 pixels
//!
//! Mirrors the IT8951 image buffer: one 4-bit gray per pixel, written by
//! packed area loads. Implements `DrawTarget` so tests can paint expected
//! content with embedded-graphics primitives.

use embedded_graphics::pixelcolor::Gray4;
use embedded_graphics::prelude::*;
use image::{GrayImage, Luma};
use platform::Rect;

/// CPU-side copy of the panel image memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Vec<Gray4>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    /// Create a framebuffer filled with white
    pub fn new(width: u32, height: u32) -> Self {
        let size = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .unwrap_or(0);
        Self {
            pixels: vec![Gray4::WHITE; size],
            width,
            height,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    // SAFETY: callers check x < width and y < height; y * width + x < width * height,
    // which is the allocated length.
    #[allow(clippy::arithmetic_side_effects)]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            usize::try_from(u64::from(y) * u64::from(self.width) + u64::from(x)).ok()
        } else {
            None
        }
    }

    /// Set pixel at coordinates; out-of-range writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Gray4) {
        if let Some(p) = self.index(x, y).and_then(|i| self.pixels.get_mut(i)) {
            *p = color;
        }
    }

    /// Get pixel at coordinates
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Gray4> {
        self.index(x, y).and_then(|i| self.pixels.get(i)).copied()
    }

    /// Fill the whole buffer
    pub fn fill(&mut self, color: Gray4) {
        self.pixels.fill(color);
    }

    /// Fill with white
    pub fn clear_white(&mut self) {
        self.fill(Gray4::WHITE);
    }

    /// Load a packed 4bpp area, left pixel in the low nibble
    ///
    /// Rows are packed back to back, so an odd-width area has rows that start
    /// mid-byte. Pixels outside the buffer are dropped.
    pub fn load_packed(&mut self, packed: &[u8], area: Rect) {
        let nibbles = packed.iter().flat_map(|&b| [b & 0x0F, b >> 4]);
        let coords = (area.top()..area.bottom())
            .flat_map(|y| (area.left()..area.right()).map(move |x| (x, y)));
        for ((x, y), n) in coords.zip(nibbles) {
            self.set_pixel(x, y, Gray4::new(n));
        }
    }

    /// Number of pixels in `area` holding `color`
    pub fn count_in(&self, area: Rect, color: Gray4) -> u64 {
        let hits = (area.top()..area.bottom())
            .flat_map(|y| (area.left()..area.right()).map(move |x| (x, y)))
            .filter(|&(x, y)| self.get_pixel(x, y) == Some(color))
            .count();
        u64::try_from(hits).unwrap_or(u64::MAX)
    }

    /// 8-bit grayscale image of the buffer
    ///
    /// Each 4-bit level `n` maps to `n * 17`, so white stays 255.
    // SAFETY: luma() <= 15; 15 * 17 = 255 fits in u8.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let luma = self.get_pixel(x, y).map_or(0xFF, |g| g.luma() * 17);
            Luma([luma])
        })
    }
}

impl DrawTarget for Framebuffer {
    type Color = Gray4;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_starts_white() {
        let fb = Framebuffer::new(8, 4);
        assert_eq!(fb.get_pixel(0, 0), Some(Gray4::WHITE));
        assert_eq!(fb.get_pixel(7, 3), Some(Gray4::WHITE));
        assert_eq!(fb.get_pixel(8, 0), None);
    }

    #[test]
    fn test_bounds_checking() {
        let mut fb = Framebuffer::new(10, 10);
        fb.set_pixel(100, 100, Gray4::BLACK); // Should not panic
        assert_eq!(fb.get_pixel(100, 100), None);
    }

    #[test]
    fn test_load_packed_nibble_order() {
        let mut fb = Framebuffer::new(4, 1);
        let area = Rect::new(0, 0, 4, 1).unwrap();
        fb.load_packed(&[0x0F, 0x6A], area);
        assert_eq!(fb.get_pixel(0, 0), Some(Gray4::new(0xF)));
        assert_eq!(fb.get_pixel(1, 0), Some(Gray4::new(0x0)));
        assert_eq!(fb.get_pixel(2, 0), Some(Gray4::new(0xA)));
        assert_eq!(fb.get_pixel(3, 0), Some(Gray4::new(0x6)));
    }

    #[test]
    fn test_load_packed_sub_area() {
        let mut fb = Framebuffer::new(8, 8);
        let area = Rect::new(2, 2, 4, 4).unwrap();
        fb.load_packed(&[0x00, 0x00], area);
        assert_eq!(fb.count_in(area, Gray4::BLACK), 4);
        assert_eq!(fb.get_pixel(1, 2), Some(Gray4::WHITE));
        assert_eq!(fb.get_pixel(4, 3), Some(Gray4::WHITE));
    }

    #[test]
    fn test_draw_target_matches_rect() {
        let mut fb = Framebuffer::new(16, 16);
        let area = Rect::new(4, 4, 12, 8).unwrap();
        Rectangle::from(area)
            .into_styled(PrimitiveStyle::with_fill(Gray4::BLACK))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.count_in(area, Gray4::BLACK), 32);
        assert_eq!(fb.count_in(Rect::new(0, 0, 16, 16).unwrap(), Gray4::BLACK), 32);
    }

    #[test]
    fn test_gray_image_levels() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set_pixel(0, 0, Gray4::BLACK);
        let img = fb.to_gray_image();
        assert_eq!(img.get_pixel(0, 0), &Luma([0]));
        assert_eq!(img.get_pixel(1, 0), &Luma([255]));
    }
}
