//! Panel driver abstraction
//!
//! ## Real Hardware Pattern
//!
//! The IT8951 exposes a small high-level command set. Applications never
//! send raw register writes; they bracket every burst of loads with a wake
//! and a sleep, and poll the busy line in between:
//!
//! ```rust,ignore
//! panel.wait_for_ready().await?;          // previous sleep may still be in flight
//! panel.activate().await?;                // SYS_RUN
//! panel.wait_for_ready().await?;          // wake must finish before a load
//! panel.draw(&packed, area, Some(WaveformMode::DU4)).await?;
//! panel.wait_for_display_ready().await?; // LUT engine idle
//! panel.sleep().await?;                   // SLEEP
//! ```
//!
//! The same trait is implemented by the headless emulator and by the
//! recording mock, so the refresh core can be exercised without hardware.
//!
//! Waits have no timeout: a panel that never reports ready blocks the caller.
//! Recovery from a wedged controller is a process restart.

use crate::Rect;
use eink_specs::{Geometry, WaveformMode};

/// Panel driver for IT8951-class controllers
///
/// All pixel data arrives packed 4 bits per pixel, two pixels per byte, low
/// pixel in the low nibble.
pub trait PanelDriver {
    /// Panel resolution reported by the controller
    fn geometry(&self) -> Geometry;

    /// Reset the controller and read device info
    async fn init(&mut self) -> Result<(), DisplayError>;

    /// Wait until the controller accepts a new command
    async fn wait_for_ready(&mut self) -> Result<(), DisplayError>;

    /// Wait until the display engine has finished the last refresh
    async fn wait_for_display_ready(&mut self) -> Result<(), DisplayError>;

    /// Leave sleep and power up the panel
    async fn activate(&mut self) -> Result<(), DisplayError>;

    /// Enter low-power sleep
    async fn sleep(&mut self) -> Result<(), DisplayError>;

    /// Load a packed area and refresh it with the given waveform
    ///
    /// `mode = None` selects the controller's default waveform.
    async fn draw(
        &mut self,
        packed: &[u8],
        area: Rect,
        mode: Option<WaveformMode>,
    ) -> Result<(), DisplayError>;

    /// Clear the whole panel to white
    async fn clear(&mut self) -> Result<(), DisplayError>;

    /// Release the transport
    async fn close(&mut self) -> Result<(), DisplayError>;
}

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// Communication error
    #[error("display communication error")]
    Communication,
    /// Display busy
    #[error("display is busy")]
    Busy,
    /// Invalid state, e.g. a load while the panel sleeps
    #[error("display in invalid state")]
    InvalidState,
    /// Timeout
    #[error("display operation timeout")]
    Timeout,
    /// Write area outside the panel or buffer size mismatch
    #[error("write area {area} rejected: {reason}")]
    InvalidArea {
        /// Requested area
        area: Rect,
        /// Why the controller refused it
        reason: &'static str,
    },
    /// Transport already closed
    #[error("display transport closed")]
    Closed,
}

/// Expected packed length for an area, two pixels per byte
pub fn packed_len(area: &Rect) -> u64 {
    area.area().div_ceil(2)
}

/// Validate a packed write against the panel bounds and buffer size
///
/// Shared by drivers so every implementation refuses the same inputs.
pub fn check_draw_area(
    geometry: Geometry,
    packed: &[u8],
    area: Rect,
) -> Result<(), DisplayError> {
    if area.right() > geometry.width || area.bottom() > geometry.height {
        return Err(DisplayError::InvalidArea {
            area,
            reason: "outside panel bounds",
        });
    }
    if packed.len() as u64 != packed_len(&area) {
        return Err(DisplayError::InvalidArea {
            area,
            reason: "buffer length does not match area",
        });
    }
    Ok(())
}
