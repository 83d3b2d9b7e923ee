//! Emulator configuration

use std::path::PathBuf;

/// Number of PNG files kept before the index wraps
pub const DEFAULT_EXPORT_HISTORY: u32 = 200;

/// Configuration for the emulated panel
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorConfig {
    /// Directory receiving one PNG per write; `None` disables export
    pub output_dir: Option<PathBuf>,
    /// Multiplier on simulated refresh times (0.0 = never busy)
    pub time_scale: f32,
    /// Refuse writes while the panel sleeps, like the real controller
    pub strict_power: bool,
    /// Export index wraps after this many files
    pub export_history: u32,
}

impl EmulatorConfig {
    /// Real-time busy simulation, no export, lenient power
    pub const DEFAULT: Self = Self {
        output_dir: None,
        time_scale: 1.0,
        strict_power: false,
        export_history: DEFAULT_EXPORT_HISTORY,
    };

    /// No busy time at all, for tests
    pub const INSTANT: Self = Self {
        output_dir: None,
        time_scale: 0.0,
        strict_power: false,
        export_history: DEFAULT_EXPORT_HISTORY,
    };

    /// Export every write into `dir`
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Scale simulated refresh durations
    #[must_use]
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
        self
    }

    /// Refuse loads while asleep
    #[must_use]
    pub fn strict_power(mut self) -> Self {
        self.strict_power = true;
        self
    }
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_scale_sanitized() {
        assert_eq!(EmulatorConfig::DEFAULT.with_time_scale(-2.0).time_scale, 0.0);
        assert_eq!(EmulatorConfig::DEFAULT.with_time_scale(f32::NAN).time_scale, 1.0);
        assert_eq!(EmulatorConfig::DEFAULT.with_time_scale(0.5).time_scale, 0.5);
    }

    #[test]
    fn test_builders() {
        let c = EmulatorConfig::INSTANT.with_output_dir("/tmp/eink").strict_power();
        assert_eq!(c.output_dir, Some(PathBuf::from("/tmp/eink")));
        assert!(c.strict_power);
        assert_eq!(c.export_history, 200);
    }
}
