//! Controller power-state accounting
//!
//! Tracks how long the emulated panel spends awake versus asleep, so tests
//! and the mirror binary can check that wakes are bracketed tightly around
//! writes.

use tokio::time::Instant;

/// Controller power state
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PowerState {
    /// Not initialized yet, or closed
    #[default]
    Off,
    /// Initialized, neither explicitly woken nor put to sleep
    Standby,
    /// Awake, accepting loads
    Active,
    /// Low-power sleep
    Sleeping,
}

impl PowerState {
    /// Whether loads are accepted by a strict controller
    pub fn accepts_loads(&self) -> bool {
        matches!(self, Self::Active | Self::Standby)
    }
}

/// Time spent per state and transition counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerStats {
    /// Explicit wakes
    pub wake_count: u32,
    /// Explicit sleeps
    pub sleep_count: u32,
    /// Time awake (milliseconds)
    pub active_time_ms: u64,
    /// Time asleep (milliseconds)
    pub sleep_time_ms: u64,
    /// Time in standby or off (milliseconds)
    pub idle_time_ms: u64,
}

impl PowerStats {
    /// Total tracked time in milliseconds
    pub fn total_runtime_ms(&self) -> u64 {
        self.active_time_ms
            .saturating_add(self.sleep_time_ms)
            .saturating_add(self.idle_time_ms)
    }

    /// Share of tracked time spent awake, 0.0 when nothing was tracked
    // SAFETY: f64 division; total is checked non-zero.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn active_ratio(&self) -> f64 {
        let total = self.total_runtime_ms();
        if total == 0 {
            return 0.0;
        }
        self.active_time_ms as f64 / total as f64
    }
}

/// Power state tracker
#[derive(Debug)]
pub struct PowerTracker {
    state: PowerState,
    stats: PowerStats,
    last_update: Instant,
}

impl PowerTracker {
    /// Start tracking in [`PowerState::Off`]
    pub fn new() -> Self {
        Self {
            state: PowerState::Off,
            stats: PowerStats::default(),
            last_update: Instant::now(),
        }
    }

    /// Account the time spent in the current state and move to `new_state`
    pub fn transition_to(&mut self, new_state: PowerState) {
        let now = Instant::now();
        let elapsed_ms =
            u64::try_from(now.saturating_duration_since(self.last_update).as_millis())
                .unwrap_or(u64::MAX);

        let bucket = match self.state {
            PowerState::Active => &mut self.stats.active_time_ms,
            PowerState::Sleeping => &mut self.stats.sleep_time_ms,
            PowerState::Off | PowerState::Standby => &mut self.stats.idle_time_ms,
        };
        *bucket = bucket.saturating_add(elapsed_ms);

        if new_state != self.state {
            match new_state {
                PowerState::Active => {
                    self.stats.wake_count = self.stats.wake_count.saturating_add(1);
                }
                PowerState::Sleeping => {
                    self.stats.sleep_count = self.stats.sleep_count.saturating_add(1);
                }
                PowerState::Off | PowerState::Standby => {}
            }
        }

        self.state = new_state;
        self.last_update = now;
    }

    /// Statistics up to the last transition
    pub fn stats(&self) -> &PowerStats {
        &self.stats
    }

    /// Current state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Forget accumulated statistics, keeping the current state
    pub fn reset(&mut self) {
        self.stats = PowerStats::default();
        self.last_update = Instant::now();
    }
}

impl Default for PowerTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_accepts_loads() {
        assert!(PowerState::Active.accepts_loads());
        assert!(PowerState::Standby.accepts_loads());
        assert!(!PowerState::Sleeping.accepts_loads());
        assert!(!PowerState::Off.accepts_loads());
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_accounting() {
        let mut tracker = PowerTracker::new();
        tracker.transition_to(PowerState::Active);
        tokio::time::advance(Duration::from_millis(300)).await;
        tracker.transition_to(PowerState::Sleeping);
        tokio::time::advance(Duration::from_millis(700)).await;
        tracker.transition_to(PowerState::Active);

        let stats = tracker.stats();
        assert_eq!(stats.active_time_ms, 300);
        assert_eq!(stats.sleep_time_ms, 700);
        assert_eq!(stats.wake_count, 2);
        assert_eq!(stats.sleep_count, 1);
        assert!((stats.active_ratio() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_state_not_counted() {
        let mut tracker = PowerTracker::new();
        tracker.transition_to(PowerState::Sleeping);
        tracker.transition_to(PowerState::Sleeping);
        assert_eq!(tracker.stats().sleep_count, 1);
    }

    #[test]
    fn test_reset() {
        let mut tracker = PowerTracker::new();
        tracker.transition_to(PowerState::Active);
        tracker.reset();
        assert_eq!(tracker.stats(), &PowerStats::default());
        assert_eq!(tracker.state(), PowerState::Active);
        assert_eq!(PowerStats::default().active_ratio(), 0.0);
    }
}
