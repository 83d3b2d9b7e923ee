//! Periodic full refresh
//!
//! Partial writes with fast waveforms leave residual ghosting that builds up
//! over time. A full-screen write at full fidelity clears it, so one runs at a
//! fixed interval, and on demand.
//!
//! There is never more than one live timer. Arming replaces the previous
//! handle; a handle that is no longer current never fires.

use std::time::Duration;

use tokio::time::Instant;

/// Handle to the live full-refresh timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTimer {
    /// When the timer fires
    pub deadline: Instant,
    /// Increases with every arm; identifies the live handle
    pub generation: u64,
}

/// Owner of the single full-refresh timer
#[derive(Debug)]
pub struct FullRefreshScheduler {
    interval: Duration,
    timer: Option<RefreshTimer>,
    generation: u64,
}

impl FullRefreshScheduler {
    /// Scheduler firing every `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timer: None,
            generation: 0,
        }
    }

    /// Configured period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Cancel any live timer and start a new one from `now`
    pub fn arm(&mut self, now: Instant) -> RefreshTimer {
        self.generation = self.generation.wrapping_add(1);
        let timer = RefreshTimer {
            deadline: now.checked_add(self.interval).unwrap_or(now),
            generation: self.generation,
        };
        if let Some(old) = self.timer.replace(timer) {
            tracing::trace!(generation = old.generation, "full refresh timer replaced");
        }
        timer
    }

    /// Stop the live timer, returning it
    pub fn cancel(&mut self) -> Option<RefreshTimer> {
        self.timer.take()
    }

    /// Live timer, if armed
    pub fn timer(&self) -> Option<RefreshTimer> {
        self.timer
    }

    /// When the live timer fires, if armed
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.deadline)
    }

    /// True if the live timer has expired at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.timer.is_some_and(|t| t.deadline <= now)
    }
}
