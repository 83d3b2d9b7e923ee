//! E-Ink Panel Specifications
//!
//! Static description of the IT8951-driven panels the refresh engine can
//! drive: resolution, write granularity, and the waveform each refresh
//! quality maps to.
//!
//! # Features
//!
//! - **no_std compatible** - Pure data, no allocation
//! - **Panel templates** - Pre-configured specs for the supported Waveshare panels
//! - **Serde support** - Optional serialization for JSON configs
//!
//! # Example
//!
//! ```
//! use eink_specs::panels::WAVESHARE_7_8;
//! use eink_specs::{LevelHint, WaveformMode};
//!
//! let spec = WAVESHARE_7_8;
//! assert_eq!((spec.width, spec.height), (1872, 1404));
//! assert_eq!(spec.variant.waveform_for(LevelHint::FewLevel), Some(WaveformMode::DU4));
//! assert_eq!(spec.variant.waveform_for(LevelHint::FullLevel), None);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod panel_spec;
pub mod panels;
mod waveform;

pub use panel_spec::{Geometry, LevelHint, PanelSpec, PanelVariant, WaveformTable};
pub use waveform::WaveformMode;
