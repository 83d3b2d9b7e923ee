//! Damage notifications from the surface

use platform::Rect;

use crate::ContractViolation;

/// Fidelity tag carried by a damaged area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DamageHint {
    /// No tag: decide from the configuration and the pixels
    #[default]
    Unknown,
    /// Content is fine with four gray levels
    ForceFewLevel,
    /// Content needs sixteen gray levels
    ForceFullLevel,
}

impl DamageHint {
    /// Hint from the two notification flags
    ///
    /// Few-level wins if both are set.
    pub const fn from_flags(force_few_level: bool, force_full_level: bool) -> Self {
        match (force_few_level, force_full_level) {
            (true, _) => Self::ForceFewLevel,
            (false, true) => Self::ForceFullLevel,
            (false, false) => Self::Unknown,
        }
    }

    /// Short name for logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::ForceFewLevel => "force-few",
            Self::ForceFullLevel => "force-full",
        }
    }
}

/// One damaged rectangle and its fidelity tag
///
/// The coalescer treats two regions as duplicates only if both the rectangle
/// and the hint match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DamageRegion {
    /// Damaged area in surface pixels
    pub rect: Rect,
    /// Fidelity tag
    pub hint: DamageHint,
}

impl DamageRegion {
    /// Pair a rectangle with a hint
    pub const fn new(rect: Rect, hint: DamageHint) -> Self {
        Self { rect, hint }
    }

    /// Validate raw notification fields
    ///
    /// Zero-area rectangles are rejected before they reach the coalescer.
    pub fn from_notification(
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        force_few_level: bool,
        force_full_level: bool,
    ) -> Result<Self, ContractViolation> {
        let rect = Rect::new(left, top, right, bottom)?;
        Ok(Self::new(
            rect,
            DamageHint::from_flags(force_few_level, force_full_level),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_precedence() {
        assert_eq!(DamageHint::from_flags(true, true), DamageHint::ForceFewLevel);
        assert_eq!(DamageHint::from_flags(true, false), DamageHint::ForceFewLevel);
        assert_eq!(DamageHint::from_flags(false, true), DamageHint::ForceFullLevel);
        assert_eq!(DamageHint::from_flags(false, false), DamageHint::Unknown);
    }

    #[test]
    fn test_from_notification() {
        let region = DamageRegion::from_notification(0, 0, 40, 40, false, true).unwrap();
        assert_eq!(region.rect, Rect::new(0, 0, 40, 40).unwrap());
        assert_eq!(region.hint, DamageHint::ForceFullLevel);
    }

    #[test]
    fn test_from_notification_rejects_zero_area() {
        let err = DamageRegion::from_notification(10, 10, 10, 20, false, false).unwrap_err();
        assert!(matches!(err, ContractViolation::DegenerateRect(_)));
    }
}
