//! Refresh configuration
//!
//! Delivered once by the host as a JSON object with camelCase keys. Every
//! field has a default, so `{}` is a valid (partial-refresh disabled) config.
//!
//! ```
//! use eink_refresh::RefreshConfig;
//!
//! let config = RefreshConfig::from_json(r#"{"debounceMs": 100, "preferFewLevel": true}"#).unwrap();
//! assert_eq!(config.debounce(), Some(std::time::Duration::from_millis(100)));
//! assert!(config.prefer_few_level);
//! ```

use std::time::Duration;

use eink_specs::panels::IT8951_WRITE_GRANULARITY;
use eink_specs::{Geometry, PanelVariant};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default interval between periodic full refreshes (1 hour)
pub const DEFAULT_FULL_REFRESH_INTERVAL_MS: u64 = 3_600_000;

/// Panel size assumed in mock mode without a geometry override
pub const DEFAULT_MOCK_GEOMETRY: Geometry = Geometry::new(1872, 1404);

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshConfig {
    /// Skip panel init, power transitions and shutdown; writes still reach the driver
    pub mock: bool,
    /// Quiet period before a partial refresh batch drains
    ///
    /// Absent disables partial refresh: damage is ignored and only full
    /// refreshes run.
    pub debounce_ms: Option<u64>,
    /// Period of the full-refresh timer
    pub full_refresh_interval_ms: u64,
    /// Treat untagged content as four-level capable
    pub prefer_few_level: bool,
    /// Waveform tuning for the attached panel
    pub panel_variant: PanelVariant,
    /// Panel size override, used in mock mode
    pub geometry: Option<Geometry>,
    /// Block size partial writes are aligned to
    pub granularity: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            mock: false,
            debounce_ms: None,
            full_refresh_interval_ms: DEFAULT_FULL_REFRESH_INTERVAL_MS,
            prefer_few_level: false,
            panel_variant: PanelVariant::Standard,
            geometry: None,
            granularity: IT8951_WRITE_GRANULARITY,
        }
    }
}

impl RefreshConfig {
    /// Parse and validate a JSON config object
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate an already decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the coordinator cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.full_refresh_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.granularity == 0 {
            return Err(ConfigError::ZeroGranularity);
        }
        if let Some(g) = self.geometry.filter(Geometry::is_empty) {
            return Err(ConfigError::EmptyGeometry {
                width: g.width,
                height: g.height,
            });
        }
        Ok(())
    }

    /// Debounce window, `None` when partial refresh is disabled
    pub fn debounce(&self) -> Option<Duration> {
        self.debounce_ms.map(Duration::from_millis)
    }

    /// Full-refresh timer period
    pub fn full_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.full_refresh_interval_ms)
    }

    /// Panel size to assume when no driver is consulted
    pub fn mock_geometry(&self) -> Geometry {
        self.geometry.unwrap_or(DEFAULT_MOCK_GEOMETRY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = RefreshConfig::from_json("{}").unwrap();
        assert_eq!(config, RefreshConfig::default());
        assert_eq!(config.debounce(), None);
        assert_eq!(config.granularity, 32);
        assert_eq!(config.full_refresh_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_camel_case_fields() {
        let config = RefreshConfig::from_json(
            r#"{
                "mock": true,
                "debounceMs": 250,
                "fullRefreshIntervalMs": 600000,
                "preferFewLevel": true,
                "panelVariant": "six-inch",
                "geometry": {"width": 1448, "height": 1072}
            }"#,
        )
        .unwrap();
        assert!(config.mock);
        assert_eq!(config.debounce(), Some(Duration::from_millis(250)));
        assert_eq!(config.full_refresh_interval(), Duration::from_secs(600));
        assert_eq!(config.panel_variant, PanelVariant::SixInch);
        assert_eq!(config.mock_geometry(), Geometry::new(1448, 1072));
    }

    #[test]
    fn test_mock_geometry_default() {
        assert_eq!(
            RefreshConfig::default().mock_geometry(),
            Geometry::new(1872, 1404)
        );
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = RefreshConfig::from_json(r#"{"fullRefreshIntervalMs": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroInterval));
    }

    #[test]
    fn test_rejects_zero_granularity() {
        let err = RefreshConfig::from_json(r#"{"granularity": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroGranularity));
    }

    #[test]
    fn test_rejects_empty_geometry() {
        let err =
            RefreshConfig::from_json(r#"{"geometry": {"width": 0, "height": 10}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGeometry { width: 0, .. }));
    }

    #[test]
    fn test_rejects_wrong_types() {
        let err = RefreshConfig::from_json(r#"{"debounceMs": "soon"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
