//! Refresh coordinator
//!
//! Owns the panel, the surface and every piece of refresh state. It runs as a
//! single task: commands arrive on an mpsc inbox, timers are plain deadlines
//! polled in the same `select!`, and every drawing session runs to completion
//! before the next event is looked at. Two sessions therefore never overlap,
//! and the panel sees exactly one wake/sleep bracket per session.
//!
//! ```text
//!   CoordinatorHandle ──mpsc──▶ inbox ─┐
//!                                      ├─▶ select! ─▶ immediate write
//!   debounce deadline ─────────────────┤             partial drain
//!   full-refresh timer ────────────────┘             full refresh
//! ```
//!
//! # Session kinds
//!
//! - Startup: one forced full-fidelity refresh before any damage is accepted
//! - Immediate: a few-level region arriving while idle, drawn without delay
//! - Partial: a debounced batch, drained FIFO region by region
//! - Full: periodic or requested whole-panel refresh; abandons pending damage
//!
//! While a partial batch drains, the inbox is checked between regions: new
//! damage joins the batch, a full-refresh request ends it early.

use eink_specs::{Geometry, LevelHint};
use platform::{PanelDriver, Rect, Surface};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::coalesce::{Admission, CoalescerState, DamageCoalescer};
use crate::power::{PanelPowerState, PowerController};
use crate::quantize::QuantizedFrame;
use crate::region::prepare_write_area;
use crate::scheduler::FullRefreshScheduler;
use crate::{ConfigError, DamageRegion, RefreshClassifier, RefreshConfig, RefreshError};

/// Messages accepted by the coordinator task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// A surface area changed
    Damage(DamageRegion),
    /// Redraw the whole panel
    FullRefresh {
        /// Skip the few-level shortcut
        force_full_fidelity: bool,
    },
    /// Stop after the current session
    Shutdown,
}

/// Drawing session kind, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Forced refresh before damage is accepted
    Startup,
    /// Few-level region drawn without debounce
    Immediate,
    /// Debounced damage batch
    Partial,
    /// Whole-panel refresh
    Full,
    /// Clear before close
    Shutdown,
}

impl SessionKind {
    /// Short name for log fields
    pub const fn name(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Immediate => "immediate",
            Self::Partial => "partial",
            Self::Full => "full",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Cloneable sender side of the coordinator inbox
///
/// Dropping every handle stops the coordinator as if [`shutdown`] had been
/// sent.
///
/// [`shutdown`]: CoordinatorHandle::shutdown
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl CoordinatorHandle {
    /// Report a damaged area
    pub fn notify_damage(&self, region: DamageRegion) -> Result<(), RefreshError> {
        self.send(Command::Damage(region))
    }

    /// Ask for a whole-panel refresh
    pub fn request_full_refresh(&self, force_full_fidelity: bool) -> Result<(), RefreshError> {
        self.send(Command::FullRefresh {
            force_full_fidelity,
        })
    }

    /// Stop the coordinator
    pub fn shutdown(&self) -> Result<(), RefreshError> {
        self.send(Command::Shutdown)
    }

    /// True once the coordinator has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), RefreshError> {
        self.tx.send(command).map_err(|_| RefreshError::Stopped)
    }
}

enum Wake {
    Command(Option<Command>),
    Debounce,
    FullRefreshDue,
}

/// Partial-refresh engine for one panel and one surface
pub struct RefreshCoordinator<D, S> {
    panel: D,
    surface: S,
    config: RefreshConfig,
    geometry: Geometry,
    power: PowerController,
    classifier: RefreshClassifier,
    coalescer: DamageCoalescer,
    scheduler: FullRefreshScheduler,
    inbox: mpsc::UnboundedReceiver<Command>,
    pending_full: Option<bool>,
    viewport_ready: bool,
    started: bool,
    stopping: bool,
}

impl<D: PanelDriver, S: Surface> RefreshCoordinator<D, S> {
    /// Build a coordinator and the handle that feeds it
    pub fn new(
        config: RefreshConfig,
        panel: D,
        surface: S,
    ) -> Result<(Self, CoordinatorHandle), ConfigError> {
        config.validate()?;
        let geometry = if config.mock {
            config.mock_geometry()
        } else {
            panel.geometry()
        };
        let (tx, inbox) = mpsc::unbounded_channel();
        let coordinator = Self {
            power: PowerController::new(config.mock),
            classifier: RefreshClassifier::new(config.prefer_few_level, config.panel_variant),
            coalescer: DamageCoalescer::new(config.debounce().unwrap_or_default()),
            scheduler: FullRefreshScheduler::new(config.full_refresh_interval()),
            panel,
            surface,
            config,
            geometry,
            inbox,
            pending_full: None,
            viewport_ready: false,
            started: false,
            stopping: false,
        };
        Ok((coordinator, CoordinatorHandle { tx }))
    }

    /// Panel resolution in use
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Panel power state as last commanded
    pub fn power_state(&self) -> PanelPowerState {
        self.power.state()
    }

    /// Partial-refresh session state
    pub fn coalescer_state(&self) -> CoalescerState {
        self.coalescer.state()
    }

    /// True once the startup refresh has run
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// When the next periodic full refresh fires
    pub fn next_full_refresh(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Start, process commands until shutdown, then stop
    ///
    /// Returns early with the error if the panel fails.
    pub async fn run(mut self) -> Result<(), RefreshError> {
        self.start().await?;
        match self.event_loop().await {
            Ok(()) => self.shutdown().await,
            Err(e) => {
                self.scheduler.cancel();
                self.coalescer.finish();
                Err(e)
            }
        }
    }

    /// Initialize the panel and draw the first full-fidelity frame
    ///
    /// Damage reported before this completes is discarded: the startup
    /// refresh already shows it.
    pub async fn start(&mut self) -> Result<(), RefreshError> {
        if self.started {
            return Ok(());
        }
        if !self.config.mock {
            self.panel.init().await?;
            self.geometry = self.panel.geometry();
        }
        self.power.sleep(&mut self.panel).await?;
        tracing::info!(
            width = self.geometry.width,
            height = self.geometry.height,
            mock = self.config.mock,
            "panel initialized"
        );

        let startup = self.full_refresh_as(SessionKind::Startup, true).await;
        self.started = true;
        self.discard_stale_damage();

        match startup {
            Err(e) if e.is_fatal() => Err(e),
            // Surface not ready yet; the periodic refresh will retry
            Err(_) | Ok(()) => Ok(()),
        }
    }

    /// Accept a damage notification
    ///
    /// Ignored before startup completes or when partial refresh is disabled.
    /// A region that resolves to few-level from its hint alone is drawn at
    /// once if no session is open; anything else joins the pending batch.
    pub async fn accept_damage(&mut self, region: DamageRegion) -> Result<(), RefreshError> {
        let Some(region) = self.admissible(region) else {
            return Ok(());
        };
        if self.coalescer.is_idle()
            && self.classifier.eager_level(region.hint) == Some(LevelHint::FewLevel)
        {
            return self.draw_immediately(region).await;
        }
        self.enqueue(region);
        Ok(())
    }

    /// Draw every pending region inside one wake/sleep bracket
    ///
    /// No-op if nothing is pending or a drain is already running.
    pub async fn drain(&mut self) -> Result<(), RefreshError> {
        if !self.coalescer.try_begin_drain() {
            return Ok(());
        }
        let result = self.drain_batch().await;
        let dropped = self.coalescer.finish();
        if dropped > 0 {
            tracing::debug!(dropped, "partial batch cut short");
        }
        self.end_session(result).await
    }

    /// Redraw the whole panel, abandoning pending damage
    ///
    /// The periodic timer is re-armed on every exit path.
    pub async fn full_refresh(&mut self, force_full_fidelity: bool) -> Result<(), RefreshError> {
        self.full_refresh_as(SessionKind::Full, force_full_fidelity)
            .await
    }

    /// Cancel timers, drop pending damage and release the panel
    pub async fn shutdown(&mut self) -> Result<(), RefreshError> {
        self.stopping = true;
        self.pending_full = None;
        self.scheduler.cancel();
        let dropped = self.coalescer.finish();

        if !self.config.mock {
            self.power.activate(&mut self.panel).await?;
            tracing::debug!(session = SessionKind::Shutdown.name(), "clearing panel");
            self.panel.clear().await?;
        }
        self.power.sleep(&mut self.panel).await?;
        if !self.config.mock {
            self.panel.close().await?;
        }
        tracing::info!(dropped, "refresh coordinator stopped");
        Ok(())
    }

    async fn event_loop(&mut self) -> Result<(), RefreshError> {
        while !self.stopping {
            if let Some(force) = self.pending_full.take() {
                let result = self.full_refresh(force).await;
                Self::settle(result)?;
                continue;
            }

            let debounce = self.coalescer.debounce_deadline();
            let full_due = self.scheduler.deadline();
            let wake = tokio::select! {
                biased;
                command = self.inbox.recv() => Wake::Command(command),
                () = sleep_until_some(debounce) => Wake::Debounce,
                () = sleep_until_some(full_due) => Wake::FullRefreshDue,
            };

            let result = match wake {
                Wake::Command(Some(command)) => self.dispatch(command).await,
                Wake::Command(None) => {
                    tracing::debug!("all coordinator handles dropped");
                    self.stopping = true;
                    Ok(())
                }
                Wake::Debounce => self.drain().await,
                Wake::FullRefreshDue => self.full_refresh(false).await,
            };
            Self::settle(result)?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> Result<(), RefreshError> {
        match command {
            Command::Damage(region) => self.accept_damage(region).await,
            Command::FullRefresh {
                force_full_fidelity,
            } => self.full_refresh(force_full_fidelity).await,
            Command::Shutdown => {
                self.stopping = true;
                Ok(())
            }
        }
    }

    /// Keep running unless the panel itself failed
    fn settle(result: Result<(), RefreshError>) -> Result<(), RefreshError> {
        match result {
            Err(e) if e.is_fatal() => Err(e),
            Err(_) | Ok(()) => Ok(()),
        }
    }

    /// Gate, align and clip an incoming region
    fn admissible(&self, region: DamageRegion) -> Option<DamageRegion> {
        if !self.started {
            tracing::debug!(rect = %region.rect, "damage before startup refresh dropped");
            return None;
        }
        if self.config.debounce_ms.is_none() {
            tracing::trace!(rect = %region.rect, "partial refresh disabled, damage ignored");
            return None;
        }
        match prepare_write_area(&region.rect, self.config.granularity, self.geometry) {
            Some(rect) => Some(DamageRegion::new(rect, region.hint)),
            None => {
                tracing::debug!(rect = %region.rect, "damage outside panel dropped");
                None
            }
        }
    }

    fn enqueue(&mut self, region: DamageRegion) {
        match self.coalescer.admit(region, Instant::now()) {
            Admission::Started => tracing::debug!(
                rect = %region.rect,
                hint = region.hint.name(),
                "partial batch opened"
            ),
            Admission::Appended => tracing::trace!(
                rect = %region.rect,
                hint = region.hint.name(),
                pending = self.coalescer.pending_len(),
                "damage appended"
            ),
            Admission::Duplicate => tracing::trace!(rect = %region.rect, "duplicate damage"),
        }
    }

    /// Pick up commands that arrived while a session was running
    fn collect_inbox(&mut self) {
        while let Ok(command) = self.inbox.try_recv() {
            match command {
                Command::Damage(region) => {
                    if let Some(region) = self.admissible(region) {
                        self.enqueue(region);
                    }
                }
                Command::FullRefresh {
                    force_full_fidelity,
                } => self.defer_full_refresh(force_full_fidelity),
                Command::Shutdown => self.stopping = true,
            }
        }
    }

    fn discard_stale_damage(&mut self) {
        let mut dropped = 0usize;
        while let Ok(command) = self.inbox.try_recv() {
            match command {
                Command::Damage(_) => dropped = dropped.saturating_add(1),
                Command::FullRefresh {
                    force_full_fidelity,
                } => self.defer_full_refresh(force_full_fidelity),
                Command::Shutdown => self.stopping = true,
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "damage from before startup discarded");
        }
    }

    /// Coalesce full-refresh requests; a forced request stays forced
    fn defer_full_refresh(&mut self, force_full_fidelity: bool) {
        let force = self.pending_full.unwrap_or(false) || force_full_fidelity;
        self.pending_full = Some(force);
    }

    async fn drain_batch(&mut self) -> Result<(), RefreshError> {
        let mut drawn = 0usize;
        loop {
            self.collect_inbox();
            if self.stopping || self.pending_full.is_some() || self.scheduler.is_due(Instant::now())
            {
                break;
            }
            let Some(region) = self.coalescer.next_region() else {
                break;
            };
            // Woken only once there is a region to draw
            self.power.activate(&mut self.panel).await?;
            self.write_region(region).await?;
            drawn = drawn.saturating_add(1);
        }
        tracing::debug!(session = SessionKind::Partial.name(), drawn, "partial batch drawn");
        Ok(())
    }

    async fn write_region(&mut self, region: DamageRegion) -> Result<(), RefreshError> {
        let result = match self.capture_region(region).await {
            Ok(frame) => self.write(SessionKind::Partial, &frame).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log_failure(SessionKind::Partial, Some(&region.rect), e);
        }
        result
    }

    async fn draw_immediately(&mut self, region: DamageRegion) -> Result<(), RefreshError> {
        let result = self.draw_immediately_inner(region).await;
        if let Err(e) = &result {
            log_failure(SessionKind::Immediate, Some(&region.rect), e);
        }
        result
    }

    async fn draw_immediately_inner(&mut self, region: DamageRegion) -> Result<(), RefreshError> {
        let frame = self.capture_region(region).await?;
        self.power.activate(&mut self.panel).await?;
        let written = self.write(SessionKind::Immediate, &frame).await;
        self.end_session(written).await
    }

    async fn full_refresh_as(
        &mut self,
        kind: SessionKind,
        force_full_fidelity: bool,
    ) -> Result<(), RefreshError> {
        self.scheduler.cancel();
        self.pending_full = None;
        let dropped = self.coalescer.finish();
        tracing::info!(
            session = kind.name(),
            force_full_fidelity,
            dropped,
            "full refresh"
        );

        let result = self.full_refresh_write(kind, force_full_fidelity).await;
        if let Err(e) = &result {
            let panel = Rect::new(0, 0, self.geometry.width, self.geometry.height).ok();
            log_failure(kind, panel.as_ref(), e);
        }
        self.scheduler.arm(Instant::now());
        result
    }

    async fn full_refresh_write(
        &mut self,
        kind: SessionKind,
        force_full_fidelity: bool,
    ) -> Result<(), RefreshError> {
        self.ensure_viewport().await?;
        let frame = self.surface.capture(None).await?;
        let summary = self.surface.content_summary().await?;
        let level = self
            .classifier
            .full_refresh_level(&summary, force_full_fidelity);
        let frame = QuantizedFrame::new(frame, level, self.classifier.waveform(level))?;

        self.power.activate(&mut self.panel).await?;
        let written = self.write(kind, &frame).await;
        self.end_session(written).await
    }

    /// Capture, classify and quantize one region
    async fn capture_region(&mut self, region: DamageRegion) -> Result<QuantizedFrame, RefreshError> {
        self.ensure_viewport().await?;
        let frame = self.surface.capture(Some(region.rect)).await?;
        let level = self.classifier.region_level(region.hint, frame.pixels());
        Ok(QuantizedFrame::new(
            frame,
            level,
            self.classifier.waveform(level),
        )?)
    }

    /// Size the surface to the panel, retrying until it accepts
    async fn ensure_viewport(&mut self) -> Result<(), RefreshError> {
        if !self.viewport_ready {
            self.surface.set_viewport(self.geometry).await?;
            self.viewport_ready = true;
        }
        Ok(())
    }

    async fn write(&mut self, kind: SessionKind, frame: &QuantizedFrame) -> Result<(), RefreshError> {
        let rect = frame.rect();
        tracing::debug!(
            session = kind.name(),
            left = rect.left(),
            top = rect.top(),
            right = rect.right(),
            bottom = rect.bottom(),
            level = frame.level().name(),
            waveform = ?frame.waveform(),
            "write"
        );
        self.panel
            .draw(frame.packed(), rect, frame.waveform())
            .await?;
        Ok(())
    }

    /// Close a wake/sleep bracket
    ///
    /// A panel that failed is left alone; anything else is put back to sleep
    /// before the session result is returned.
    async fn end_session(&mut self, result: Result<(), RefreshError>) -> Result<(), RefreshError> {
        match result {
            Err(e) if e.is_fatal() => Err(e),
            other => {
                self.power.sleep(&mut self.panel).await?;
                other
            }
        }
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn log_failure(kind: SessionKind, rect: Option<&Rect>, error: &RefreshError) {
    let (left, top, right, bottom) =
        rect.map_or((0, 0, 0, 0), |r| (r.left(), r.top(), r.right(), r.bottom()));
    if error.is_fatal() {
        tracing::error!(
            session = kind.name(),
            left,
            top,
            right,
            bottom,
            error = %error,
            "panel failure"
        );
    } else {
        tracing::warn!(
            session = kind.name(),
            left,
            top,
            right,
            bottom,
            error = %error,
            "session aborted"
        );
    }
}
