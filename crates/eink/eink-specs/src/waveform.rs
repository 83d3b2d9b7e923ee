//! IT8951 Waveform Modes
//!
//! Numeric mode codes as accepted by the IT8951 display command. Each mode
//! trades refresh speed and flashing against gray-level fidelity.

/// Waveform modes understood by the IT8951 controller
///
/// The discriminant is the mode number sent with the display command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum WaveformMode {
    /// DU - Direct Update
    ///
    /// - **Grayscale**: 2 levels (black & white only)
    /// - **Duration**: ~260ms
    /// - **Flashing**: None
    DU = 1,

    /// GC16 - Grayscale Clearing 16-level
    ///
    /// - **Grayscale**: 16 levels
    /// - **Duration**: ~450ms on 7.8" panels
    /// - **Flashing**: Full flash, clears ghosting
    ///
    /// The controller's default when no mode is requested.
    GC16 = 2,

    /// GL16 - 16 grays, little ghosting on white backgrounds
    GL16 = 3,

    /// GLR16 - 16 grays, reduced flash, heavier ghosting
    GLR16 = 4,

    /// GLD16 - 16 grays tuned for 6" panels
    ///
    /// Used as the fast few-level mode on 6" panels, where DU4 leaves
    /// visible artifacts.
    GLD16 = 5,

    /// A2 - Animation mode
    ///
    /// - **Grayscale**: 2 levels
    /// - **Duration**: ~120ms (ultra-fast)
    /// - **Ghosting**: High accumulation
    A2 = 6,

    /// DU4 - Direct Update 4-level
    ///
    /// - **Grayscale**: 4 levels (white, light gray, dark gray, black)
    /// - **Duration**: ~260ms
    /// - **Ghosting**: Rare
    ///
    /// The few-level mode of the standard panels.
    DU4 = 7,
}

impl WaveformMode {
    /// Mode number sent to the controller
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Typical time the controller stays busy after a display command
    pub const fn base_duration_ms(self) -> u32 {
        match self {
            Self::A2 => 120,
            Self::DU | Self::DU4 => 260,
            Self::GLD16 | Self::GLR16 => 380,
            Self::GC16 | Self::GL16 => 450,
        }
    }

    /// Check if this is a fast, non-clearing update mode
    pub const fn is_fast_mode(self) -> bool {
        matches!(self, Self::DU | Self::DU4 | Self::A2 | Self::GLD16)
    }

    /// Get human-readable name
    pub const fn name(self) -> &'static str {
        match self {
            Self::DU => "DU",
            Self::GC16 => "GC16",
            Self::GL16 => "GL16",
            Self::GLR16 => "GLR16",
            Self::GLD16 => "GLD16",
            Self::A2 => "A2",
            Self::DU4 => "DU4",
        }
    }
}

impl core::fmt::Display for WaveformMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
