//! Panel specification types

/// Resolved gray-level fidelity for one write
///
/// The panel renders either four widely spaced grays through a fast waveform
/// or the full sixteen through a slower, clearing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum LevelHint {
    /// 4 gray levels: white, light gray, dark gray, black
    FewLevel,
    /// 16 gray levels
    FullLevel,
}

impl LevelHint {
    /// Get human-readable name
    pub const fn name(self) -> &'static str {
        match self {
            Self::FewLevel => "few-level",
            Self::FullLevel => "full-level",
        }
    }
}

/// Waveform requested for each resolved level hint
///
/// `None` leaves the choice to the controller (GC16 on IT8951).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformTable {
    /// Mode used for few-level writes
    pub few_level: Option<crate::WaveformMode>,
    /// Mode used for full-level writes
    pub full_level: Option<crate::WaveformMode>,
}

/// Physical panel variants with distinct waveform tuning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PanelVariant {
    /// 7.8" / 10.3" Waveshare HAT panels
    #[default]
    Standard,
    /// 6" Kindle-class panels
    SixInch,
}

impl PanelVariant {
    /// Static waveform lookup for this variant
    pub const fn waveforms(self) -> WaveformTable {
        match self {
            Self::Standard => WaveformTable {
                few_level: Some(crate::WaveformMode::DU4),
                full_level: None,
            },
            Self::SixInch => WaveformTable {
                few_level: Some(crate::WaveformMode::GLD16),
                full_level: None,
            },
        }
    }

    /// Waveform to request for a resolved level hint
    pub const fn waveform_for(self, level: LevelHint) -> Option<crate::WaveformMode> {
        let table = self.waveforms();
        match level {
            LevelHint::FewLevel => table.few_level,
            LevelHint::FullLevel => table.full_level,
        }
    }
}

/// Panel resolution in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Geometry {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Geometry {
    /// Create a geometry
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either side is zero
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count, saturating on overflow
    pub const fn area(&self) -> u64 {
        (self.width as u64).saturating_mul(self.height as u64)
    }
}

/// Complete specification of a supported panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSpec {
    /// Panel name (e.g., "Waveshare 7.8\" HAT")
    pub name: &'static str,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Waveform tuning variant
    pub variant: PanelVariant,

    /// Block size, in pixels, partial writes must be aligned to
    pub write_granularity: u32,
}

impl PanelSpec {
    /// Panel resolution
    pub const fn geometry(&self) -> Geometry {
        Geometry::new(self.width, self.height)
    }
}
