//! Host side of the e-ink mirror
//!
//! Feeds the refresh coordinator from a line-oriented JSON host channel and
//! supplies a surface backed by an image file. The `eink-mirror` binary wires
//! both to the emulated panel.
//!
//! # Messages
//!
//! | `notification` | `payload` |
//! |---|---|
//! | `CONFIG` | [`eink_refresh::RefreshConfig`] as camelCase JSON, once |
//! | `IT8951_ASK_FULL_REFRESH` | `false` allows few-level, anything else forces sixteen levels |
//! | `DAMAGE` | `{left, top, right, bottom, forceFewLevel?, forceFullLevel?}` |
//! | `STOP` | none |

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

pub mod bridge;
pub mod message;
pub mod surface;

pub use bridge::{BridgeAction, BridgeError, HostBridge};
pub use message::{DamagePayload, HostMessage};
pub use surface::ImageFileSurface;
