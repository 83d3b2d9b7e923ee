//! Level and waveform selection
//!
//! Decides, per write, whether the pixels go out at four or sixteen gray
//! levels, and which waveform the controller should use for that.
//!
//! For a damaged region:
//!
//! 1. Tagged few-level: few-level, no pixel inspection
//! 2. Untagged (or few-level preferred) with `preferFewLevel`: few-level
//! 3. Otherwise: few-level only if every captured pixel is already on the
//!    four-entry palette
//!
//! For a full refresh, few-level is used only if every visible content area
//! qualifies. A forced refresh is always full-level.

use eink_specs::{LevelHint, PanelVariant, WaveformMode};
use platform::ContentSummary;

use crate::quantize::classify_as_few_level;
use crate::DamageHint;

/// Per-write level and waveform decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshClassifier {
    prefer_few_level: bool,
    variant: PanelVariant,
}

impl RefreshClassifier {
    /// Classifier for a panel variant
    pub const fn new(prefer_few_level: bool, variant: PanelVariant) -> Self {
        Self {
            prefer_few_level,
            variant,
        }
    }

    /// Level decided from the hint alone, `None` if the pixels must be read
    pub fn eager_level(&self, hint: DamageHint) -> Option<LevelHint> {
        match hint {
            DamageHint::ForceFewLevel => Some(LevelHint::FewLevel),
            DamageHint::Unknown if self.prefer_few_level => Some(LevelHint::FewLevel),
            DamageHint::Unknown | DamageHint::ForceFullLevel => None,
        }
    }

    /// Level for a damaged region given its captured pixels
    ///
    /// A full-level tag only prevents the eager few-level shortcut; pixels
    /// that are already on the palette still go out few-level.
    pub fn region_level(&self, hint: DamageHint, pixels: &[u8]) -> LevelHint {
        self.eager_level(hint).unwrap_or_else(|| {
            if classify_as_few_level(pixels) {
                LevelHint::FewLevel
            } else {
                LevelHint::FullLevel
            }
        })
    }

    /// Level for a full-screen refresh
    ///
    /// An area is few-level eligible if tagged few-level, or untagged while
    /// few-level is preferred. A surface with no visible areas is eligible.
    pub fn full_refresh_level(&self, summary: &ContentSummary, forced: bool) -> LevelHint {
        if forced {
            return LevelHint::FullLevel;
        }
        let eligible = if self.prefer_few_level {
            summary.force_few_level.saturating_add(summary.untagged())
        } else {
            summary.force_few_level
        };
        if summary.force_full_level == 0 && eligible >= summary.visible {
            LevelHint::FewLevel
        } else {
            LevelHint::FullLevel
        }
    }

    /// Waveform for a resolved level on this panel variant
    pub fn waveform(&self, level: LevelHint) -> Option<WaveformMode> {
        self.variant.waveform_for(level)
    }
}
