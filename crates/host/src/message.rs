//! Host channel messages
//!
//! One JSON object per line: `{"notification": "...", "payload": ...}`.

use eink_refresh::{ContractViolation, DamageRegion};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration, accepted once
pub const CONFIG: &str = "CONFIG";
/// Full refresh request; payload `false` allows few-level
pub const ASK_FULL_REFRESH: &str = "IT8951_ASK_FULL_REFRESH";
/// Changed rectangle of the surface
pub const DAMAGE: &str = "DAMAGE";
/// Clear and release the panel, then exit
pub const STOP: &str = "STOP";

/// One message from the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMessage {
    /// Message kind
    pub notification: String,
    /// Kind-specific body
    #[serde(default)]
    pub payload: Value,
}

impl HostMessage {
    /// Build a message
    pub fn new(notification: impl Into<String>, payload: Value) -> Self {
        Self {
            notification: notification.into(),
            payload,
        }
    }

    /// Parse one line of the host channel
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Body of a [`DAMAGE`] message, in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamagePayload {
    /// Left edge (inclusive)
    pub left: u32,
    /// Top edge (inclusive)
    pub top: u32,
    /// Right edge (exclusive)
    pub right: u32,
    /// Bottom edge (exclusive)
    pub bottom: u32,
    /// Content is fine with four gray levels
    #[serde(default)]
    pub force_few_level: bool,
    /// Content needs sixteen gray levels
    #[serde(default)]
    pub force_full_level: bool,
}

impl DamagePayload {
    /// Validate into a damage region
    pub fn into_region(self) -> Result<DamageRegion, ContractViolation> {
        DamageRegion::from_notification(
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.force_few_level,
            self.force_full_level,
        )
    }
}

/// Whether a full refresh request insists on sixteen levels
///
/// Only an explicit `false` lets the refresh pick few-level.
pub fn force_full_fidelity(payload: &Value) -> bool {
    !matches!(payload, Value::Bool(false))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eink_refresh::DamageHint;
    use serde_json::json;

    #[test]
    fn test_parse_without_payload() {
        let msg = HostMessage::parse(r#"{"notification":"STOP"}"#).unwrap();
        assert_eq!(msg.notification, STOP);
        assert_eq!(msg.payload, Value::Null);
    }

    #[test]
    fn test_force_full_fidelity() {
        assert!(force_full_fidelity(&Value::Null));
        assert!(force_full_fidelity(&json!(true)));
        assert!(force_full_fidelity(&json!("false")));
        assert!(force_full_fidelity(&json!(0)));
        assert!(!force_full_fidelity(&json!(false)));
    }

    #[test]
    fn test_damage_payload() {
        let p: DamagePayload = serde_json::from_value(
            json!({"left": 0, "top": 0, "right": 40, "bottom": 40, "forceFewLevel": true}),
        )
        .unwrap();
        let region = p.into_region().unwrap();
        assert_eq!(region.hint, DamageHint::ForceFewLevel);
        assert_eq!(region.rect.right(), 40);
    }

    #[test]
    fn test_degenerate_damage_rejected() {
        let p = DamagePayload {
            left: 0,
            top: 0,
            right: 0,
            bottom: 10,
            force_few_level: false,
            force_full_level: false,
        };
        assert!(matches!(
            p.into_region(),
            Err(ContractViolation::DegenerateRect(_))
        ));
    }
}
