//! Error types for the refresh core
//!
//! Panel failures are fatal to the coordinator; surface failures abort the
//! current session only; contract violations are rejected at the boundary
//! before any state changes.

use platform::{DisplayError, RectError, SurfaceError};

/// Input that breaks a caller-side contract
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    /// Quantization needs pixel pairs
    #[error("pixel buffer of odd length {0}")]
    OddLength(usize),
    /// Damage rectangle with no area
    #[error(transparent)]
    DegenerateRect(#[from] RectError),
    /// Configuration may only be accepted once per process
    #[error("configuration already received")]
    ConfigReceivedTwice,
    /// Command arrived before configuration
    #[error("not configured")]
    NotConfigured,
}

/// Configuration rejected during validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed JSON or wrong field types
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// Periodic full refresh would fire continuously
    #[error("fullRefreshIntervalMs must be greater than zero")]
    ZeroInterval,
    /// Alignment to zero-pixel blocks is undefined
    #[error("granularity must be greater than zero")]
    ZeroGranularity,
    /// Geometry override with a zero side
    #[error("geometry {width}x{height} is empty")]
    EmptyGeometry {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

/// Refresh core errors
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// Caller contract broken
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    /// Bad configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Panel driver failure
    #[error("panel: {0}")]
    Panel(#[from] DisplayError),
    /// Surface capture failure
    #[error("surface: {0}")]
    Surface(#[from] SurfaceError),
    /// Coordinator no longer accepts commands
    #[error("refresh coordinator stopped")]
    Stopped,
}

impl RefreshError {
    /// True if the coordinator cannot continue after this error
    ///
    /// A refused write area is a caller mistake, not a transport failure, so
    /// it stays recoverable.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Panel(DisplayError::InvalidArea { .. }) => false,
            Self::Panel(_) | Self::Stopped => true,
            Self::Contract(_) | Self::Config(_) | Self::Surface(_) => false,
        }
    }
}
