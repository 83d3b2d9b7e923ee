//! Headless IT8951 panel
//!
//! `EmulatedPanel` implements [`PanelDriver`] over an in-memory Gray4
//! framebuffer. Each load blocks the display engine for the waveform's
//! refresh time (scaled by the config), and can be exported as a PNG so a
//! mirror running without hardware still leaves a visible trail.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eink_specs::{Geometry, PanelSpec, WaveformMode};
use platform::display::check_draw_area;
use platform::{DisplayError, PanelDriver, Rect};
use tokio::time::Instant;

use crate::config::EmulatorConfig;
use crate::framebuffer::Framebuffer;
use crate::power::{PowerState, PowerStats, PowerTracker};

/// Waveform the controller applies when a load names none
pub const DEFAULT_WAVEFORM: WaveformMode = WaveformMode::GC16;

/// Refresh counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayStats {
    /// Loads refreshed with a sixteen-level waveform
    pub full_level_count: u64,
    /// Loads refreshed with a fast waveform
    pub fast_count: u64,
    /// Whole-panel clears
    pub clear_count: u64,
    /// Simulated display engine time (milliseconds)
    pub total_refresh_time_ms: u64,
    /// PNG files written
    pub exported: u64,
    /// PNG exports that failed
    pub export_failures: u64,
}

impl DisplayStats {
    fn record_refresh(&mut self, mode: WaveformMode, duration_ms: u32) {
        if mode.is_fast_mode() {
            self.fast_count = self.fast_count.saturating_add(1);
        } else {
            self.full_level_count = self.full_level_count.saturating_add(1);
        }
        self.total_refresh_time_ms = self
            .total_refresh_time_ms
            .saturating_add(u64::from(duration_ms));
    }

    /// All loads, whatever the waveform
    pub fn refresh_count(&self) -> u64 {
        self.full_level_count.saturating_add(self.fast_count)
    }
}

/// Emulator errors
#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    /// PNG encoding or file write failed
    #[error("screenshot export failed: {0}")]
    Export(#[from] image::ImageError),
}

/// In-memory IT8951 panel
#[derive(Debug)]
pub struct EmulatedPanel {
    geometry: Geometry,
    framebuffer: Framebuffer,
    config: EmulatorConfig,
    power: PowerTracker,
    stats: DisplayStats,
    busy_until: Instant,
    export_index: u32,
    closed: bool,
}

impl EmulatedPanel {
    /// Create a panel of the given resolution
    pub fn new(geometry: Geometry, config: EmulatorConfig) -> Self {
        Self {
            geometry,
            framebuffer: Framebuffer::new(geometry.width, geometry.height),
            config,
            power: PowerTracker::new(),
            stats: DisplayStats::default(),
            busy_until: Instant::now(),
            export_index: 0,
            closed: false,
        }
    }

    /// Create a panel matching a known panel spec
    pub fn from_spec(spec: &PanelSpec, config: EmulatorConfig) -> Self {
        Self::new(spec.geometry(), config)
    }

    /// Panel memory
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Refresh counters
    pub fn stats(&self) -> &DisplayStats {
        &self.stats
    }

    /// Power-state accounting
    pub fn power_stats(&self) -> &PowerStats {
        self.power.stats()
    }

    /// Current power state
    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the display engine is still running the last refresh
    pub fn is_busy(&self) -> bool {
        Instant::now() < self.busy_until
    }

    /// Index the next exported PNG will use
    pub fn export_index(&self) -> u32 {
        self.export_index
    }

    /// Save the panel memory as an 8-bit grayscale PNG
    pub fn screenshot(&self, path: impl AsRef<Path>) -> Result<(), EmulatorError> {
        self.framebuffer.to_gray_image().save(path)?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DisplayError> {
        if self.closed {
            return Err(DisplayError::Closed);
        }
        Ok(())
    }

    // SAFETY: f64 product of a u32 and a finite non-negative scale.
    #[allow(clippy::arithmetic_side_effects)]
    fn start_refresh(&mut self, mode: WaveformMode) {
        let base = mode.base_duration_ms();
        let secs = f64::from(base) * f64::from(self.config.time_scale) / 1000.0;
        let busy = Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
        let now = Instant::now();
        self.busy_until = now.checked_add(busy).unwrap_or(now);
        self.stats.record_refresh(mode, base);
    }

    fn next_export_path(&mut self) -> Option<PathBuf> {
        let dir = self.config.output_dir.as_ref()?;
        let path = dir.join(format!("screenshot-{}.png", self.export_index));
        let next = self.export_index.saturating_add(1);
        self.export_index = next
            .checked_rem(self.config.export_history)
            .unwrap_or(0);
        Some(path)
    }

    fn export(&mut self) {
        let Some(path) = self.next_export_path() else {
            return;
        };
        match self.screenshot(&path) {
            Ok(()) => {
                self.stats.exported = self.stats.exported.saturating_add(1);
                tracing::debug!(path = %path.display(), "exported panel image");
            }
            Err(e) => {
                self.stats.export_failures = self.stats.export_failures.saturating_add(1);
                tracing::warn!(path = %path.display(), error = %e, "panel image export failed");
            }
        }
    }
}

impl PanelDriver for EmulatedPanel {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    async fn init(&mut self) -> Result<(), DisplayError> {
        self.ensure_open()?;
        self.framebuffer.clear_white();
        self.power.transition_to(PowerState::Standby);
        tracing::debug!(
            width = self.geometry.width,
            height = self.geometry.height,
            "emulated panel initialized"
        );
        Ok(())
    }

    async fn wait_for_ready(&mut self) -> Result<(), DisplayError> {
        self.ensure_open()
    }

    async fn wait_for_display_ready(&mut self) -> Result<(), DisplayError> {
        self.ensure_open()?;
        tokio::time::sleep_until(self.busy_until).await;
        Ok(())
    }

    async fn activate(&mut self) -> Result<(), DisplayError> {
        self.ensure_open()?;
        self.power.transition_to(PowerState::Active);
        Ok(())
    }

    async fn sleep(&mut self) -> Result<(), DisplayError> {
        self.ensure_open()?;
        self.power.transition_to(PowerState::Sleeping);
        Ok(())
    }

    async fn draw(
        &mut self,
        packed: &[u8],
        area: Rect,
        mode: Option<WaveformMode>,
    ) -> Result<(), DisplayError> {
        self.ensure_open()?;
        if self.config.strict_power && !self.power.state().accepts_loads() {
            return Err(DisplayError::InvalidState);
        }
        check_draw_area(self.geometry, packed, area)?;

        self.framebuffer.load_packed(packed, area);
        let mode = mode.unwrap_or(DEFAULT_WAVEFORM);
        self.start_refresh(mode);
        tracing::trace!(%area, waveform = mode.name(), "emulated load");
        self.export();
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), DisplayError> {
        self.ensure_open()?;
        self.framebuffer.clear_white();
        self.start_refresh(DEFAULT_WAVEFORM);
        self.stats.clear_count = self.stats.clear_count.saturating_add(1);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DisplayError> {
        if !self.closed {
            self.power.transition_to(PowerState::Off);
            self.closed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Gray4;
    use embedded_graphics::prelude::GrayColor;

    fn panel() -> EmulatedPanel {
        EmulatedPanel::new(Geometry::new(64, 32), EmulatorConfig::INSTANT)
    }

    #[tokio::test]
    async fn test_draw_loads_framebuffer() {
        let mut p = panel();
        p.init().await.unwrap();
        let area = Rect::new(0, 0, 32, 32).unwrap();
        p.draw(&[0x00; 512], area, Some(WaveformMode::DU4))
            .await
            .unwrap();
        assert_eq!(p.framebuffer().count_in(area, Gray4::BLACK), 1024);
        assert_eq!(p.framebuffer().get_pixel(40, 0), Some(Gray4::WHITE));
        assert_eq!(p.stats().fast_count, 1);
    }

    #[tokio::test]
    async fn test_default_waveform_counts_as_full_level() {
        let mut p = panel();
        let area = Rect::new(0, 0, 2, 1).unwrap();
        p.draw(&[0xFF], area, None).await.unwrap();
        assert_eq!(p.stats().full_level_count, 1);
        assert_eq!(p.stats().total_refresh_time_ms, 450);
    }

    #[tokio::test]
    async fn test_out_of_bounds_rejected() {
        let mut p = panel();
        let area = Rect::new(32, 0, 96, 32).unwrap();
        let err = p.draw(&[0; 1024], area, None).await.unwrap_err();
        assert!(matches!(err, DisplayError::InvalidArea { .. }));
        assert_eq!(p.stats().refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_strict_power_rejects_sleeping_loads() {
        let mut p = EmulatedPanel::new(
            Geometry::new(64, 32),
            EmulatorConfig::INSTANT.strict_power(),
        );
        let area = Rect::new(0, 0, 2, 1).unwrap();
        assert_eq!(p.draw(&[0], area, None).await, Err(DisplayError::InvalidState));

        p.activate().await.unwrap();
        assert!(p.draw(&[0], area, None).await.is_ok());

        p.sleep().await.unwrap();
        assert_eq!(p.draw(&[0], area, None).await, Err(DisplayError::InvalidState));
    }

    #[tokio::test]
    async fn test_closed_panel_refuses_everything() {
        let mut p = panel();
        p.close().await.unwrap();
        p.close().await.unwrap();
        assert!(p.is_closed());
        assert_eq!(p.activate().await, Err(DisplayError::Closed));
        assert_eq!(p.clear().await, Err(DisplayError::Closed));
        assert_eq!(p.power_state(), PowerState::Off);
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_ready_waits_for_refresh() {
        let mut p = EmulatedPanel::new(Geometry::new(64, 32), EmulatorConfig::DEFAULT);
        let area = Rect::new(0, 0, 2, 1).unwrap();
        let start = Instant::now();
        p.draw(&[0], area, Some(WaveformMode::DU4)).await.unwrap();
        assert!(p.is_busy());
        p.wait_for_display_ready().await.unwrap();
        assert!(!p.is_busy());
        let waited = Instant::now().duration_since(start);
        assert_eq!(
            waited,
            Duration::from_millis(u64::from(WaveformMode::DU4.base_duration_ms()))
        );
    }

    #[tokio::test]
    async fn test_clear_whitens() {
        let mut p = panel();
        let area = Rect::new(0, 0, 2, 1).unwrap();
        p.draw(&[0x00], area, None).await.unwrap();
        p.clear().await.unwrap();
        assert_eq!(p.framebuffer().get_pixel(0, 0), Some(Gray4::WHITE));
        assert_eq!(p.stats().clear_count, 1);
    }

    #[test]
    fn test_from_spec_geometry() {
        let spec = &eink_specs::panels::WAVESHARE_10_3;
        let p = EmulatedPanel::from_spec(spec, EmulatorConfig::INSTANT);
        assert_eq!(p.geometry(), spec.geometry());
        assert_eq!(p.framebuffer().get_pixel(0, 0).map(|g| g.luma()), Some(15));
    }
}
