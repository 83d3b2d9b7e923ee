//! IT8951 panel specifications
//!
//! Pre-configured specs for the panels driven through the IT8951 HAT.
//! Every IT8951 panel shares the 32 px write granularity.

use crate::{PanelSpec, PanelVariant};

/// Block alignment required by IT8951 partial loads
pub const IT8951_WRITE_GRANULARITY: u32 = 32;

/// Waveshare 7.8" e-Paper HAT (1872×1404)
///
/// Default panel and default mock geometry.
pub const WAVESHARE_7_8: PanelSpec = PanelSpec {
    name: "Waveshare 7.8\" HAT",
    width: 1872,
    height: 1404,
    variant: PanelVariant::Standard,
    write_granularity: IT8951_WRITE_GRANULARITY,
};

/// Waveshare 10.3" e-Paper HAT (1872×1404)
pub const WAVESHARE_10_3: PanelSpec = PanelSpec {
    name: "Waveshare 10.3\" HAT",
    width: 1872,
    height: 1404,
    variant: PanelVariant::Standard,
    write_granularity: IT8951_WRITE_GRANULARITY,
};

/// Waveshare 6" HD e-Paper HAT (1448×1072)
pub const WAVESHARE_6_HD: PanelSpec = PanelSpec {
    name: "Waveshare 6\" HD HAT",
    width: 1448,
    height: 1072,
    variant: PanelVariant::SixInch,
    write_granularity: IT8951_WRITE_GRANULARITY,
};

/// Kindle-class 6" panel (800×600)
pub const KINDLE_6: PanelSpec = PanelSpec {
    name: "6\" Kindle-class panel",
    width: 800,
    height: 600,
    variant: PanelVariant::SixInch,
    write_granularity: IT8951_WRITE_GRANULARITY,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_panels_share_granularity() {
        for spec in [WAVESHARE_7_8, WAVESHARE_10_3, WAVESHARE_6_HD, KINDLE_6] {
            assert_eq!(spec.write_granularity, 32, "{}", spec.name);
            assert!(!spec.geometry().is_empty());
        }
    }
}
