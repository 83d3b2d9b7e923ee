//! Partial-refresh coordination for IT8951 e-ink panels
//!
//! Mirrors a continuously changing surface onto an e-ink panel. Small changes
//! go out as fast partial writes, content that only needs four grays uses the
//! fast waveforms, and a periodic full-fidelity refresh clears the ghosting
//! the fast writes leave behind.
//!
//! # Pipeline
//!
//! ```text
//! damage ─▶ DamageCoalescer ─┐
//!                            ├─▶ RefreshCoordinator ─▶ capture ─▶ classify
//! timer  ─▶ FullRefreshScheduler                                      │
//!                                                                     ▼
//!                        PanelDriver ◀── PowerController ◀── quantize + pack
//! ```
//!
//! # Modules
//!
//! - [`region`] - Block alignment, union and clipping of rectangles
//! - [`quantize`] - 8-bit gray to packed 4bpp, few-level palette
//! - [`power`] - Wake/sleep bracketing of panel writes
//! - [`classify`] - Few-level vs full-level and waveform selection
//! - [`coalesce`] - Damage batching into sessions
//! - [`scheduler`] - Single live full-refresh timer
//! - [`coordinator`] - The task tying it together
//!
//! # Example
//!
//! ```no_run
//! use eink_refresh::{DamageRegion, RefreshConfig, RefreshCoordinator};
//! use platform::mocks::{MockPanel, MockSurface};
//!
//! # async fn demo() -> Result<(), eink_refresh::RefreshError> {
//! let config = RefreshConfig::from_json(r#"{"debounceMs": 100}"#)?;
//! let panel = MockPanel::new(1872, 1404);
//! let surface = MockSurface::solid(1872, 1404, 0xFF);
//! let (coordinator, handle) = RefreshCoordinator::new(config, panel, surface)?;
//!
//! handle.notify_damage(DamageRegion::from_notification(0, 0, 40, 40, false, false)?)?;
//! handle.shutdown()?;
//! coordinator.run().await
//! # }
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

pub mod classify;
pub mod coalesce;
pub mod config;
pub mod coordinator;
pub mod damage;
pub mod error;
pub mod power;
pub mod quantize;
pub mod region;
pub mod scheduler;

pub use classify::RefreshClassifier;
pub use coalesce::{Admission, CoalescerState, DamageCoalescer};
pub use config::RefreshConfig;
pub use coordinator::{Command, CoordinatorHandle, RefreshCoordinator, SessionKind};
pub use damage::{DamageHint, DamageRegion};
pub use error::{ConfigError, ContractViolation, RefreshError};
pub use power::{PanelPowerState, PowerController};
pub use quantize::{QuantizedFrame, FEW_LEVEL_PALETTE};
pub use scheduler::{FullRefreshScheduler, RefreshTimer};
