//! Lightmap - drive Art-Net fixtures from video
//!
//! Runs the Art-Net output on its own, fed by a test pattern, so a fixture
//! patch can be checked without the full video pipeline.

#![warn(missing_docs)]

mod logging_setup;
mod pattern;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use lightmap_control::{ArtNetConfig, ArtNetConsumer};
use lightmap_core::{Color, FrameConsumer, LogConfig, VideoField, VideoFormatDesc};
use tracing::{info, warn};

use crate::pattern::{parse_color, PatternKind, TestPattern};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "lightmap", version, about = "Drive Art-Net fixtures from video")]
struct Args {
    /// Art-Net output configuration (.toml or .json)
    config: PathBuf,

    /// Test pattern fed to the output
    #[arg(long, value_enum, default_value_t = PatternKind::Cycle)]
    pattern: PatternKind,

    /// Color of the solid pattern, `#rrggbb` or `r,g,b`
    #[arg(long, value_parser = parse_color, default_value = "#ffffff")]
    color: Color,

    /// Frame width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Frames produced per second
    #[arg(long, default_value_t = 25.0)]
    fps: f64,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write logs to a file in the data directory
    #[arg(long)]
    log_file: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_config = LogConfig {
        level: args.log_level.clone(),
        file_output: args.log_file,
        ..LogConfig::default()
    };
    let _log_guard = logging_setup::init(&log_config)?;

    let config = ArtNetConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let mut consumer = ArtNetConsumer::new(config).context("Failed to create Art-Net output")?;

    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be a positive number, got {}", args.fps);
    }
    let format = VideoFormatDesc::new("test-pattern", args.width, args.height, args.fps);
    consumer.initialize(&format, 1);
    info!("Output: {}", consumer.print());

    let pattern = TestPattern::new(args.pattern, args.width, args.height, args.color);
    let consumer = run(consumer, pattern, args.fps).await;

    info!("Final state: {:?}", consumer.state());
    // Dropping the consumer stops and joins the pacing thread
    tokio::task::spawn_blocking(move || drop(consumer))
        .await
        .context("Failed to stop Art-Net output")?;
    Ok(())
}

/// Feed pattern frames into `consumer` until Ctrl-C
async fn run(consumer: ArtNetConsumer, pattern: TestPattern, fps: f64) -> ArtNetConsumer {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let start = Instant::now();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let frame = Arc::new(pattern.frame(start.elapsed().as_secs_f64()));
                if !consumer.send(VideoField::Progressive, frame).await {
                    warn!("Frame rejected by {}", consumer.print());
                }
            }
            res = &mut shutdown => {
                if let Err(e) = res {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Shutting down");
                break;
            }
        }
    }

    consumer
}
