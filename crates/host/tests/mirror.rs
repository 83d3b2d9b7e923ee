//! Mock-mode mirror: image file in, emulated panel PNGs out
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use eink_emulator::{EmulatedPanel, EmulatorConfig};
use eink_refresh::{RefreshConfig, RefreshCoordinator};
use host::{BridgeAction, HostBridge, ImageFileSurface};
use image::{GrayImage, Luma};
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_mock_mirror_exports_each_write() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("page.png");
    GrayImage::from_pixel(64, 64, Luma([0])).save(&source).unwrap();

    let mut bridge = HostBridge::new();
    let config: RefreshConfig = match bridge
        .handle_line(
            r#"{"notification":"CONFIG","payload":
                {"mock":true,"debounceMs":50,"geometry":{"width":64,"height":64}}}"#,
        )
        .unwrap()
    {
        BridgeAction::Configure(config) => *config,
        other => panic!("expected configuration, got {other:?}"),
    };

    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    // Deliberately the wrong size: mock mode takes geometry from the config.
    let panel = EmulatedPanel::new(
        eink_specs::Geometry::new(640, 480),
        EmulatorConfig::INSTANT.with_output_dir(&out),
    );
    let surface = ImageFileSurface::new(&source);
    let (coordinator, handle) = RefreshCoordinator::new(config, panel, surface).unwrap();
    assert_eq!(coordinator.geometry(), eink_specs::Geometry::new(64, 64));
    bridge.attach(handle);

    let (result, ()) = tokio::join!(coordinator.run(), async {
        sleep(Duration::from_millis(1)).await;
        bridge
            .handle_line(r#"{"notification":"DAMAGE","payload":{"left":0,"top":0,"right":10,"bottom":10}}"#)
            .unwrap();
        sleep(Duration::from_millis(100)).await;
        bridge.handle_line(r#"{"notification":"STOP"}"#).unwrap();
    });
    result.unwrap();

    assert!(out.join("screenshot-0.png").exists());
    assert!(out.join("screenshot-1.png").exists());
    assert!(!out.join("screenshot-2.png").exists());

    let first = image::open(out.join("screenshot-0.png")).unwrap().into_luma8();
    assert_eq!(first.get_pixel(0, 0).0, [0]);
}

#[tokio::test]
async fn test_strict_emulator_accepts_powered_session() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("page.png");
    GrayImage::from_pixel(64, 32, Luma([255])).save(&source).unwrap();

    let config = RefreshConfig::from_json("{}").unwrap();
    let panel = EmulatedPanel::new(
        eink_specs::Geometry::new(64, 32),
        EmulatorConfig::INSTANT.strict_power(),
    );
    let (coordinator, handle) =
        RefreshCoordinator::new(config, panel, ImageFileSurface::new(&source)).unwrap();
    handle.shutdown().unwrap();
    // The coordinator owns the panel; a strict emulator would fail the run if
    // any write happened outside a wake.
    coordinator.run().await.unwrap();
}
