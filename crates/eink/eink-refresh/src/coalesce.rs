//! Damage coalescing
//!
//! Damage arrives in bursts: a page animating, a clock ticking, several
//! widgets re-rendering together. The first region of a burst opens a session
//! and starts the debounce delay; everything that arrives before or during
//! the drain joins the same batch, so one wake/sleep bracket covers the whole
//! burst.
//!
//! ```text
//!            admit (first)              try_begin_drain
//!   Idle ─────────────────▶ Draining ─────────────────▶ Draining (drain running)
//!    ▲                        (debounce)                        │
//!    └────────────────────── finish / abandon ◀─────────────────┘
//! ```
//!
//! Regions are kept separate rather than unioned: two small updates at
//! opposite corners would otherwise rewrite the whole panel.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use tokio::time::Instant;

use crate::DamageRegion;

/// Session state of the coalescer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoalescerState {
    /// No pending damage
    #[default]
    Idle,
    /// A batch is open, waiting for the debounce or being drawn
    Draining,
}

/// Outcome of offering a region to the coalescer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First region of a new session; the debounce delay starts now
    Started,
    /// Appended to the open batch
    Appended,
    /// Same rectangle and hint already waiting to be drawn
    Duplicate,
}

/// Batches damage regions into drawing sessions
#[derive(Debug)]
pub struct DamageCoalescer {
    state: CoalescerState,
    pending: VecDeque<DamageRegion>,
    seen: HashSet<DamageRegion>,
    debounce: Duration,
    deadline: Option<Instant>,
    drain_running: bool,
}

impl DamageCoalescer {
    /// Coalescer with the given quiet period
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: CoalescerState::Idle,
            pending: VecDeque::new(),
            seen: HashSet::new(),
            debounce,
            deadline: None,
            drain_running: false,
        }
    }

    /// Current session state
    pub fn state(&self) -> CoalescerState {
        self.state
    }

    /// True if no session is open
    pub fn is_idle(&self) -> bool {
        self.state == CoalescerState::Idle
    }

    /// True while a drain holds the batch
    pub fn is_draining(&self) -> bool {
        self.drain_running
    }

    /// Regions waiting to be drawn
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Offer a region
    ///
    /// Opens a session when idle. A (rectangle, hint) pair is queued at most
    /// once while it waits; once drawn it can be damaged again.
    pub fn admit(&mut self, region: DamageRegion, now: Instant) -> Admission {
        if self.state == CoalescerState::Idle {
            self.state = CoalescerState::Draining;
            self.deadline = Some(now.checked_add(self.debounce).unwrap_or(now));
            self.seen.insert(region);
            self.pending.push_back(region);
            return Admission::Started;
        }
        if !self.seen.insert(region) {
            return Admission::Duplicate;
        }
        self.pending.push_back(region);
        Admission::Appended
    }

    /// When the open batch should start draining
    ///
    /// `None` when idle or once the drain has started.
    pub fn debounce_deadline(&self) -> Option<Instant> {
        if self.drain_running {
            None
        } else {
            self.deadline
        }
    }

    /// Claim the batch for drawing
    ///
    /// Returns false if there is nothing to drain or a drain already runs.
    pub fn try_begin_drain(&mut self) -> bool {
        if self.state != CoalescerState::Draining || self.drain_running {
            return false;
        }
        self.drain_running = true;
        self.deadline = None;
        true
    }

    /// Next region in arrival order
    pub fn next_region(&mut self) -> Option<DamageRegion> {
        let region = self.pending.pop_front()?;
        self.seen.remove(&region);
        Some(region)
    }

    /// Close the session, dropping anything not yet drawn
    ///
    /// Returns the number of regions dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.seen.clear();
        self.deadline = None;
        self.drain_running = false;
        self.state = CoalescerState::Idle;
        dropped
    }
}
