//! Host channel against a live coordinator and the recording mocks
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

use std::time::Duration;

use eink_refresh::{ConfigError, ContractViolation, RefreshConfig, RefreshCoordinator, RefreshError};
use eink_specs::WaveformMode;
use host::{BridgeAction, BridgeError, HostBridge};
use platform::mocks::{MockPanel, MockSurface};
use platform::Rect;
use tokio::time::sleep;

const W: u32 = 256;
const H: u32 = 128;

const CONFIG_PARTIAL: &str = r#"{"notification":"CONFIG","payload":{"debounceMs":100}}"#;

fn configure(bridge: &mut HostBridge, line: &str) -> RefreshConfig {
    match bridge.handle_line(line).unwrap() {
        BridgeAction::Configure(config) => *config,
        other => panic!("expected configuration, got {other:?}"),
    }
}

#[test]
fn test_commands_before_config_are_refused() {
    let mut bridge = HostBridge::new();
    for line in [
        r#"{"notification":"DAMAGE","payload":{"left":0,"top":0,"right":8,"bottom":8}}"#,
        r#"{"notification":"IT8951_ASK_FULL_REFRESH"}"#,
        r#"{"notification":"STOP"}"#,
    ] {
        assert!(matches!(
            bridge.handle_line(line),
            Err(BridgeError::Contract(ContractViolation::NotConfigured))
        ));
    }
    assert!(!bridge.is_configured());
}

#[test]
fn test_config_accepted_once() {
    let mut bridge = HostBridge::new();
    let config = configure(&mut bridge, CONFIG_PARTIAL);
    assert_eq!(config.debounce_ms, Some(100));
    assert!(bridge.is_configured());

    assert!(matches!(
        bridge.handle_line(CONFIG_PARTIAL),
        Err(BridgeError::Contract(ContractViolation::ConfigReceivedTwice))
    ));
}

#[test]
fn test_invalid_config_leaves_bridge_unconfigured() {
    let mut bridge = HostBridge::new();
    let bad = r#"{"notification":"CONFIG","payload":{"fullRefreshIntervalMs":0}}"#;
    assert!(matches!(
        bridge.handle_line(bad),
        Err(BridgeError::Config(ConfigError::ZeroInterval))
    ));
    assert!(!bridge.is_configured());
    configure(&mut bridge, CONFIG_PARTIAL);
}

#[test]
fn test_malformed_and_blank_lines() {
    let mut bridge = HostBridge::new();
    assert!(matches!(
        bridge.handle_line("not json"),
        Err(BridgeError::Malformed(_))
    ));
    assert!(matches!(
        bridge.handle_line("   "),
        Ok(BridgeAction::Ignored)
    ));
}

#[test]
fn test_dead_coordinator_is_fatal() {
    let mut bridge = HostBridge::new();
    let config = configure(&mut bridge, CONFIG_PARTIAL);
    let (coordinator, handle) =
        RefreshCoordinator::new(config, MockPanel::new(W, H), MockSurface::solid(W, H, 0xFF))
            .unwrap();
    bridge.attach(handle);
    drop(coordinator);

    let err = bridge
        .handle_line(r#"{"notification":"IT8951_ASK_FULL_REFRESH"}"#)
        .unwrap_err();
    assert!(matches!(err, BridgeError::Refresh(RefreshError::Stopped)));
    assert!(err.is_fatal());
}

#[test]
fn test_unknown_notification_ignored() {
    let mut bridge = HostBridge::new();
    let config = configure(&mut bridge, CONFIG_PARTIAL);
    let (_coordinator, handle) =
        RefreshCoordinator::new(config, MockPanel::new(W, H), MockSurface::solid(W, H, 0xFF))
            .unwrap();
    bridge.attach(handle);
    assert!(matches!(
        bridge.handle_line(r#"{"notification":"HELLO","payload":42}"#),
        Ok(BridgeAction::Ignored)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_messages_drive_the_coordinator() {
    let mut bridge = HostBridge::new();
    let config = configure(&mut bridge, CONFIG_PARTIAL);
    let panel = MockPanel::new(W, H);
    let recorder = panel.recorder();
    let (coordinator, handle) =
        RefreshCoordinator::new(config, panel, MockSurface::solid(W, H, 0xFF)).unwrap();
    bridge.attach(handle);

    let (result, ()) = tokio::join!(coordinator.run(), async {
        sleep(Duration::from_millis(1)).await;
        let damage = r#"{"notification":"DAMAGE","payload":
            {"left":0,"top":0,"right":40,"bottom":40,"forceFewLevel":true}}"#
            .replace('\n', "");
        assert!(matches!(
            bridge.handle_line(&damage),
            Ok(BridgeAction::Forwarded)
        ));
        sleep(Duration::from_millis(1)).await;
        assert!(matches!(
            bridge.handle_line(r#"{"notification":"IT8951_ASK_FULL_REFRESH","payload":false}"#),
            Ok(BridgeAction::Forwarded)
        ));
        sleep(Duration::from_millis(1)).await;
        assert!(matches!(
            bridge.handle_line(r#"{"notification":"STOP"}"#),
            Ok(BridgeAction::Stop)
        ));
    });
    result.unwrap();

    let draws = recorder.draws();
    assert_eq!(draws.len(), 3);
    // startup, always sixteen levels
    assert_eq!(draws[0].0, Rect::new(0, 0, W, H).unwrap());
    assert_eq!(draws[0].1, None);
    // tagged damage goes out at once, block aligned
    assert_eq!(draws[1].0, Rect::new(0, 0, 64, 64).unwrap());
    assert_eq!(draws[1].1, Some(WaveformMode::DU4));
    // payload false, nothing tagged full-level: few-level allowed
    assert_eq!(draws[2].0, Rect::new(0, 0, W, H).unwrap());
    assert_eq!(draws[2].1, Some(WaveformMode::DU4));
}
