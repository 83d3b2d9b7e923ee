//! Collaborator contracts for the e-ink refresh engine
//!
//! This crate defines the boundary between the refresh core and the things
//! it drives or reads from, so the core can run against real hardware, the
//! emulator, or recording mocks without code changes.
//!
//! # Architecture Layers
//!
//! ```text
//! Host application (host crate: message bridge, surface adapters)
//!         ↓
//! Refresh core (eink-refresh: coalescing, classification, power)
//!         ↓
//! Platform contracts (this crate - traits and value types)
//!         ↓
//! Panel driver (IT8951 transport, or eink-emulator)
//! ```
//!
//! # Contracts
//!
//! - [`PanelDriver`] - Power transitions and packed writes to the panel
//! - [`Surface`] - Pixel snapshots of the content being mirrored
//! - [`Rect`] - Validated half-open rectangle in device pixels
//!
//! # Features
//!
//! - `mocks`: Recording mock implementations of every trait
//!
//! # Example
//!
//! ```no_run
//! use platform::{PanelDriver, Rect};
//!
//! async fn blank<D: PanelDriver>(panel: &mut D) -> Result<(), platform::DisplayError> {
//!     panel.wait_for_ready().await?;
//!     panel.activate().await?;
//!     panel.clear().await?;
//!     panel.sleep().await
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // single-threaded executor: Send bounds not needed

pub mod display;
pub mod rect;
pub mod surface;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use display::{DisplayError, PanelDriver};
pub use rect::{Rect, RectError};
pub use surface::{ContentSummary, Frame, Surface, SurfaceError};

pub use eink_specs::{Geometry, WaveformMode};
