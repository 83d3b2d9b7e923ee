//! `eink-mirror`: mirror an image file onto an emulated IT8951 panel
//!
//! Reads host messages as JSON lines on stdin. Logs go to stderr, filtered by
//! `RUST_LOG` (default `info`).

#![allow(missing_docs)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use eink_emulator::{EmulatedPanel, EmulatorConfig};
use eink_refresh::{RefreshConfig, RefreshCoordinator};
use eink_specs::{panels, PanelSpec};
use host::{BridgeAction, HostBridge, ImageFileSurface};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eink-mirror")]
#[command(about = "Mirror an image file onto an e-ink panel with partial refresh", long_about = None)]
#[command(version)]
struct Cli {
    /// Grayscale image to mirror, re-read on every capture
    #[arg(long)]
    image: PathBuf,
    /// Directory receiving one PNG per panel write
    #[arg(long, default_value = "/tmp")]
    output_dir: PathBuf,
    /// Multiplier on emulated refresh durations
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,
    /// Refuse panel writes while it sleeps (non-mock configurations only)
    #[arg(long)]
    strict_power: bool,
    /// Emulated panel model; mock configurations use their own geometry
    #[arg(long, value_enum, default_value_t = PanelModel::Waveshare78)]
    panel: PanelModel,
}

#[derive(Clone, Copy, ValueEnum)]
enum PanelModel {
    /// Waveshare 7.8" HAT, 1872×1404
    #[value(name = "waveshare-7.8")]
    Waveshare78,
    /// Waveshare 10.3" HAT, 1872×1404
    #[value(name = "waveshare-10.3")]
    Waveshare103,
    /// Waveshare 6" HD HAT, 1448×1072
    #[value(name = "waveshare-6-hd")]
    Waveshare6Hd,
    /// 6" Kindle-class panel, 800×600
    #[value(name = "kindle-6")]
    Kindle6,
}

impl PanelModel {
    fn spec(self) -> &'static PanelSpec {
        match self {
            Self::Waveshare78 => &panels::WAVESHARE_7_8,
            Self::Waveshare103 => &panels::WAVESHARE_10_3,
            Self::Waveshare6Hd => &panels::WAVESHARE_6_HD,
            Self::Kindle6 => &panels::KINDLE_6,
        }
    }
}

type HostLines = Lines<BufReader<Stdin>>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut bridge = HostBridge::new();

    let Some(config) = await_config(&mut lines, &mut bridge).await? else {
        tracing::info!("host channel closed before configuration");
        return Ok(());
    };

    let mut emulator = EmulatorConfig::DEFAULT
        .with_output_dir(&cli.output_dir)
        .with_time_scale(cli.time_scale);
    if cli.strict_power {
        if config.mock {
            // Mock mode never wakes the panel, so every write would be refused.
            tracing::warn!("--strict-power has no effect in mock mode");
        } else {
            emulator = emulator.strict_power();
        }
    }
    let panel = if config.mock {
        EmulatedPanel::new(config.mock_geometry(), emulator)
    } else {
        let spec = cli.panel.spec();
        tracing::info!(panel = spec.name, "emulating panel");
        EmulatedPanel::from_spec(spec, emulator)
    };
    let surface = ImageFileSurface::new(&cli.image);

    let (coordinator, handle) = RefreshCoordinator::new(config, panel, surface)?;
    bridge.attach(handle);

    let run = coordinator.run();
    tokio::pin!(run);
    tokio::select! {
        result = &mut run => return result.context("refresh coordinator failed"),
        fed = forward(&mut lines, &mut bridge) => {
            if let Err(e) = fed {
                tracing::error!(error = %e, "host channel read failed");
            }
        }
    }

    // Channel closed or STOP received: let the coordinator wind down.
    if let Err(e) = bridge.shutdown() {
        tracing::debug!(error = %e, "coordinator already stopped");
    }
    run.await.context("refresh coordinator failed")
}

/// Read until the first accepted configuration
async fn await_config(
    lines: &mut HostLines,
    bridge: &mut HostBridge,
) -> Result<Option<RefreshConfig>> {
    while let Some(line) = lines.next_line().await? {
        match bridge.handle_line(&line) {
            Ok(BridgeAction::Configure(config)) => return Ok(Some(*config)),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "message rejected"),
        }
    }
    Ok(None)
}

/// Forward host messages until STOP, end of input, or a dead coordinator
async fn forward(lines: &mut HostLines, bridge: &mut HostBridge) -> std::io::Result<()> {
    while let Some(line) = lines.next_line().await? {
        match bridge.handle_line(&line) {
            Ok(BridgeAction::Stop) => break,
            Ok(_) => {}
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "coordinator gone");
                break;
            }
            Err(e) => tracing::warn!(error = %e, "message rejected"),
        }
    }
    Ok(())
}
