//! Panel power sequencing
//!
//! Every burst of writes is bracketed by one wake and one sleep. The
//! controller must have finished the previous command before it accepts a
//! wake, and must have finished refreshing before it is put to sleep, or the
//! last waveform is cut short.
//!
//! ```text
//! Unknown ──sleep──▶ Sleeping ──activate──▶ Active ──sleep──▶ Sleeping
//! ```
//!
//! In mock mode the controller tracks the state transitions without touching
//! the driver.

use platform::{DisplayError, PanelDriver};

/// Power state as last commanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPowerState {
    /// Before the first transition, or after a driver error mid-sequence
    #[default]
    Unknown,
    /// Awake and accepting loads
    Active,
    /// Low-power sleep
    Sleeping,
}

/// Wake/sleep sequencing for a [`PanelDriver`]
#[derive(Debug, Default)]
pub struct PowerController {
    state: PanelPowerState,
    mock: bool,
    wake_count: u64,
}

impl PowerController {
    /// Controller driving a real panel, or only tracking state if `mock`
    pub fn new(mock: bool) -> Self {
        Self {
            state: PanelPowerState::Unknown,
            mock,
            wake_count: 0,
        }
    }

    /// Current power state
    pub fn state(&self) -> PanelPowerState {
        self.state
    }

    /// True if driver calls are skipped
    pub fn is_mock(&self) -> bool {
        self.mock
    }

    /// Wake sequences issued so far
    pub fn wake_count(&self) -> u64 {
        self.wake_count
    }

    /// Wake the panel: wait ready, activate, wait ready
    ///
    /// No-op if already active.
    pub async fn activate<D: PanelDriver>(&mut self, panel: &mut D) -> Result<(), DisplayError> {
        if self.state == PanelPowerState::Active {
            return Ok(());
        }
        if !self.mock {
            self.state = PanelPowerState::Unknown;
            panel.wait_for_ready().await?;
            panel.activate().await?;
            panel.wait_for_ready().await?;
        }
        self.state = PanelPowerState::Active;
        self.wake_count = self.wake_count.saturating_add(1);
        tracing::trace!(mock = self.mock, "panel active");
        Ok(())
    }

    /// Put the panel to sleep once the display engine is idle
    ///
    /// No-op if already sleeping.
    pub async fn sleep<D: PanelDriver>(&mut self, panel: &mut D) -> Result<(), DisplayError> {
        if self.state == PanelPowerState::Sleeping {
            return Ok(());
        }
        if !self.mock {
            self.state = PanelPowerState::Unknown;
            panel.wait_for_display_ready().await?;
            panel.sleep().await?;
        }
        self.state = PanelPowerState::Sleeping;
        tracing::trace!(mock = self.mock, "panel sleeping");
        Ok(())
    }
}
