//! Mock implementations for testing
//!
//! Recording mocks of [`PanelDriver`] and [`Surface`]. Both hand out a cheap
//! cloneable recorder before being moved into the code under test, so a test
//! can inspect what happened afterwards.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::display::check_draw_area;
use crate::*;

/// One call observed by [`MockPanel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCall {
    /// `init()`
    Init,
    /// `wait_for_ready()`
    WaitForReady,
    /// `wait_for_display_ready()`
    WaitForDisplayReady,
    /// `activate()`
    Activate,
    /// `sleep()`
    Sleep,
    /// `draw()`
    Draw {
        /// Target area
        area: Rect,
        /// Requested waveform
        mode: Option<WaveformMode>,
        /// Packed pixels as written
        packed: Vec<u8>,
    },
    /// `clear()`
    Clear,
    /// `close()`
    Close,
}

/// Shared view of the calls a [`MockPanel`] received
#[derive(Debug, Clone, Default)]
pub struct PanelRecorder {
    calls: Arc<Mutex<Vec<PanelCall>>>,
    failing_draws: Arc<AtomicUsize>,
}

impl PanelRecorder {
    fn push(&self, call: PanelCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Snapshot of every call so far, in order
    pub fn calls(&self) -> Vec<PanelCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls matching `pred`
    pub fn count(&self, pred: impl Fn(&PanelCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| pred(c))
            .count()
    }

    /// Every `draw()` as `(area, mode, packed)`
    pub fn draws(&self) -> Vec<(Rect, Option<WaveformMode>, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PanelCall::Draw { area, mode, packed } => Some((area, mode, packed)),
                _ => None,
            })
            .collect()
    }

    /// Number of wake commands issued
    pub fn activations(&self) -> usize {
        self.count(|c| matches!(c, PanelCall::Activate))
    }

    /// Number of sleep commands issued
    pub fn sleeps(&self) -> usize {
        self.count(|c| matches!(c, PanelCall::Sleep))
    }

    /// Forget recorded calls
    pub fn reset(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Make the next `n` draws fail with [`DisplayError::Communication`]
    pub fn fail_next_draws(&self, n: usize) {
        self.failing_draws.store(n, Ordering::SeqCst);
    }

    fn take_draw_failure(&self) -> bool {
        self.failing_draws
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Mock panel driver
///
/// Records every call. With [`MockPanel::strict_power`] it also refuses
/// loads while asleep, the way a real IT8951 ignores them.
pub struct MockPanel {
    geometry: Geometry,
    recorder: PanelRecorder,
    awake: bool,
    strict_power: bool,
    busy: Duration,
}

impl MockPanel {
    /// Create new mock panel
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            geometry: Geometry::new(width, height),
            recorder: PanelRecorder::default(),
            awake: false,
            strict_power: false,
            busy: Duration::ZERO,
        }
    }

    /// Refuse draws unless activated
    #[must_use]
    pub fn strict_power(mut self) -> Self {
        self.strict_power = true;
        self
    }

    /// Simulated latency of each wait
    #[must_use]
    pub fn with_busy_time(mut self, busy: Duration) -> Self {
        self.busy = busy;
        self
    }

    /// Handle for inspecting calls after the panel is moved
    pub fn recorder(&self) -> PanelRecorder {
        self.recorder.clone()
    }

    async fn busy_wait(&self) {
        if !self.busy.is_zero() {
            tokio::time::sleep(self.busy).await;
        }
    }
}

impl PanelDriver for MockPanel {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    async fn init(&mut self) -> Result<(), DisplayError> {
        self.recorder.push(PanelCall::Init);
        self.awake = true;
        Ok(())
    }

    async fn wait_for_ready(&mut self) -> Result<(), DisplayError> {
        self.recorder.push(PanelCall::WaitForReady);
        self.busy_wait().await;
        Ok(())
    }

    async fn wait_for_display_ready(&mut self) -> Result<(), DisplayError> {
        self.recorder.push(PanelCall::WaitForDisplayReady);
        self.busy_wait().await;
        Ok(())
    }

    async fn activate(&mut self) -> Result<(), DisplayError> {
        self.recorder.push(PanelCall::Activate);
        self.awake = true;
        Ok(())
    }

    async fn sleep(&mut self) -> Result<(), DisplayError> {
        self.recorder.push(PanelCall::Sleep);
        self.awake = false;
        Ok(())
    }

    async fn draw(
        &mut self,
        packed: &[u8],
        area: Rect,
        mode: Option<WaveformMode>,
    ) -> Result<(), DisplayError> {
        if self.recorder.take_draw_failure() {
            return Err(DisplayError::Communication);
        }
        if self.strict_power && !self.awake {
            return Err(DisplayError::InvalidState);
        }
        check_draw_area(self.geometry, packed, area)?;
        self.recorder.push(PanelCall::Draw {
            area,
            mode,
            packed: packed.to_vec(),
        });
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), DisplayError> {
        self.recorder.push(PanelCall::Clear);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DisplayError> {
        self.recorder.push(PanelCall::Close);
        Ok(())
    }
}

/// Shared view of a [`MockSurface`]
#[derive(Debug, Clone, Default)]
pub struct SurfaceRecorder {
    captures: Arc<Mutex<Vec<Option<Rect>>>>,
    viewport: Arc<Mutex<Option<Geometry>>>,
    summary: Arc<Mutex<ContentSummary>>,
    failing_captures: Arc<AtomicUsize>,
    failing_viewports: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl SurfaceRecorder {
    /// Every capture request so far, `None` for full frame
    pub fn captures(&self) -> Vec<Option<Rect>> {
        self.captures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Viewport last set by the caller
    pub fn viewport(&self) -> Option<Geometry> {
        *self.viewport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the reported content census
    pub fn set_summary(&self, summary: ContentSummary) {
        *self.summary.lock().unwrap_or_else(PoisonError::into_inner) = summary;
    }

    /// Make the next `n` captures fail
    pub fn fail_next_captures(&self, n: usize) {
        self.failing_captures.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` viewport changes fail with [`SurfaceError::NotReady`]
    pub fn fail_next_viewports(&self, n: usize) {
        self.failing_viewports.store(n, Ordering::SeqCst);
    }

    /// Highest number of captures observed in progress at once
    pub fn max_concurrent_captures(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn take_capture_failure(&self) -> bool {
        self.failing_captures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn take_viewport_failure(&self) -> bool {
        self.failing_viewports
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

type PixelFn = Box<dyn Fn(u32, u32) -> u8>;

/// Mock surface producing synthetic gray content
pub struct MockSurface {
    geometry: Geometry,
    pixel: PixelFn,
    capture_delay: Duration,
    recorder: SurfaceRecorder,
}

impl MockSurface {
    /// Surface filled with one gray value
    pub fn solid(width: u32, height: u32, gray: u8) -> Self {
        Self::with_pixels(width, height, move |_, _| gray)
    }

    /// Surface whose pixel at `(x, y)` is `pixel(x, y)`
    pub fn with_pixels(width: u32, height: u32, pixel: impl Fn(u32, u32) -> u8 + 'static) -> Self {
        Self {
            geometry: Geometry::new(width, height),
            pixel: Box::new(pixel),
            capture_delay: Duration::ZERO,
            recorder: SurfaceRecorder::default(),
        }
    }

    /// Simulated time each capture takes
    #[must_use]
    pub fn with_capture_delay(mut self, delay: Duration) -> Self {
        self.capture_delay = delay;
        self
    }

    /// Handle for inspecting the surface after it is moved
    pub fn recorder(&self) -> SurfaceRecorder {
        self.recorder.clone()
    }

    fn bounds(&self) -> Result<Rect, SurfaceError> {
        let g = self.recorder.viewport().unwrap_or(self.geometry);
        Rect::new(0, 0, g.width, g.height).map_err(|_| SurfaceError::NotReady)
    }
}

impl Surface for MockSurface {
    async fn set_viewport(&mut self, geometry: Geometry) -> Result<(), SurfaceError> {
        if self.recorder.take_viewport_failure() {
            return Err(SurfaceError::NotReady);
        }
        *self
            .recorder
            .viewport
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(geometry);
        Ok(())
    }

    async fn capture(&mut self, region: Option<Rect>) -> Result<Frame, SurfaceError> {
        self.recorder
            .captures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(region);

        let now = self
            .recorder
            .in_flight
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1);
        self.recorder.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.capture_delay.is_zero() {
            tokio::time::sleep(self.capture_delay).await;
        }
        self.recorder.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.recorder.take_capture_failure() {
            return Err(SurfaceError::CaptureFailed("injected failure".into()));
        }

        let bounds = self.bounds()?;
        let rect = region.unwrap_or(bounds);
        if !bounds.contains_rect(&rect) {
            return Err(SurfaceError::OutOfBounds(rect));
        }
        let pixels = (rect.top()..rect.bottom())
            .flat_map(|y| (rect.left()..rect.right()).map(move |x| (x, y)))
            .map(|(x, y)| (self.pixel)(x, y))
            .collect();
        Frame::new(pixels, rect)
    }

    async fn content_summary(&mut self) -> Result<ContentSummary, SurfaceError> {
        Ok(*self
            .recorder
            .summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner))
    }
}
