//! Surface backed by an image file
//!
//! The file is re-read on every capture, so whatever rewrites it (a renderer,
//! a screenshot tool) is mirrored on the next damage or full refresh. Images
//! whose size differs from the viewport are scaled to fit.

use std::path::{Path, PathBuf};

use eink_specs::Geometry;
use image::imageops::{self, FilterType};
use image::GrayImage;
use platform::{ContentSummary, Frame, Rect, Surface, SurfaceError};

/// Grayscale snapshots of an image on disk
#[derive(Debug, Clone)]
pub struct ImageFileSurface {
    path: PathBuf,
    viewport: Option<Geometry>,
    summary: ContentSummary,
}

impl ImageFileSurface {
    /// Surface over `path`, reported as one untagged content area
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            viewport: None,
            summary: ContentSummary {
                visible: 1,
                force_few_level: 0,
                force_full_level: 0,
            },
        }
    }

    /// Override the content census used for full refreshes
    #[must_use]
    pub fn with_summary(mut self, summary: ContentSummary) -> Self {
        self.summary = summary;
        self
    }

    /// Image being mirrored
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Viewport set by the coordinator, if any
    pub fn viewport(&self) -> Option<Geometry> {
        self.viewport
    }

    fn load(&self) -> Result<GrayImage, SurfaceError> {
        let img = image::open(&self.path)
            .map_err(|e| SurfaceError::CaptureFailed(format!("{}: {e}", self.path.display())))?
            .into_luma8();
        match self.viewport {
            Some(g) if img.dimensions() != (g.width, g.height) => {
                Ok(imageops::resize(&img, g.width, g.height, FilterType::Triangle))
            }
            _ => Ok(img),
        }
    }
}

impl Surface for ImageFileSurface {
    async fn set_viewport(&mut self, geometry: Geometry) -> Result<(), SurfaceError> {
        if geometry.is_empty() {
            return Err(SurfaceError::NotReady);
        }
        self.viewport = Some(geometry);
        Ok(())
    }

    async fn capture(&mut self, region: Option<Rect>) -> Result<Frame, SurfaceError> {
        let img = self.load()?;
        let (width, height) = img.dimensions();
        let full = Rect::from_origin_size(0, 0, width, height)
            .map_err(|_| SurfaceError::CaptureFailed("empty image".into()))?;
        let rect = region.unwrap_or(full);
        if !full.contains_rect(&rect) {
            return Err(SurfaceError::OutOfBounds(rect));
        }

        let pixels = if rect == full {
            img.into_raw()
        } else {
            imageops::crop_imm(&img, rect.left(), rect.top(), rect.width(), rect.height())
                .to_image()
                .into_raw()
        };
        Frame::new(pixels, rect)
    }

    async fn content_summary(&mut self) -> Result<ContentSummary, SurfaceError> {
        Ok(self.summary)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use image::Luma;

    fn write_image(dir: &Path, w: u32, h: u32) -> PathBuf {
        let path = dir.join("surface.png");
        let img = GrayImage::from_fn(w, h, |x, _| Luma([if x < w / 2 { 0 } else { 255 }]));
        img.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_capture_region() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = ImageFileSurface::new(write_image(dir.path(), 64, 32));
        let rect = Rect::new(24, 0, 40, 2).unwrap();
        let frame = s.capture(Some(rect)).await.unwrap();
        assert_eq!(frame.rect(), rect);
        assert_eq!(&frame.pixels()[..8], &[0; 8]);
        assert_eq!(&frame.pixels()[8..16], &[255; 8]);
    }

    #[tokio::test]
    async fn test_viewport_rescales() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = ImageFileSurface::new(write_image(dir.path(), 64, 32));
        s.set_viewport(Geometry::new(128, 64)).await.unwrap();
        let frame = s.capture(None).await.unwrap();
        assert_eq!((frame.width(), frame.height()), (128, 64));
    }

    #[tokio::test]
    async fn test_out_of_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = ImageFileSurface::new(write_image(dir.path(), 64, 32));
        let rect = Rect::new(32, 0, 96, 32).unwrap();
        assert_eq!(
            s.capture(Some(rect)).await,
            Err(SurfaceError::OutOfBounds(rect))
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let mut s = ImageFileSurface::new("/nonexistent/surface.png");
        assert!(matches!(
            s.capture(None).await,
            Err(SurfaceError::CaptureFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_default_summary() {
        let mut s = ImageFileSurface::new("unused.png");
        let summary = s.content_summary().await.unwrap();
        assert_eq!(summary.visible, 1);
        assert_eq!(summary.untagged(), 1);
    }
}
