//! Headless IT8951 panel emulator
//!
//! Stands in for the panel when no hardware is attached. Every load lands in
//! an in-memory Gray4 framebuffer; the display engine is "busy" for as long
//! as the chosen waveform would take on glass, and each load can be exported
//! as a PNG for inspection.
//!
//! # Example
//!
//! ```no_run
//! use eink_emulator::{EmulatedPanel, EmulatorConfig};
//! use eink_specs::Geometry;
//!
//! let panel = EmulatedPanel::new(
//!     Geometry::new(1872, 1404),
//!     EmulatorConfig::DEFAULT.with_output_dir("/tmp"),
//! );
//! # let _ = panel;
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

pub mod config;
pub mod framebuffer;
pub mod panel;
pub mod power;

pub use config::{EmulatorConfig, DEFAULT_EXPORT_HISTORY};
pub use framebuffer::Framebuffer;
pub use panel::{DisplayStats, EmulatedPanel, EmulatorError, DEFAULT_WAVEFORM};
pub use power::{PowerState, PowerStats, PowerTracker};
