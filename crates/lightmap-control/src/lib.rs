//! Lightmap Control - Art-Net Output for Video Frames
//!
//! This crate samples regions of the latest video frame and streams them to
//! lighting fixtures over Art-Net:
//! - **Config**: recognized option set and validation of the host's tree
//! - **DMX**: fixture encoding, ArtDmx framing, UDP transport, the frame
//!   mailbox and the fixed-rate pacing loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lightmap_control::{ArtNetConfig, ArtNetConsumer, FixtureConfig, FixtureType, SenderConfig};
//!
//! # fn main() -> lightmap_control::Result<()> {
//! let config = ArtNetConfig {
//!     refresh_rate: 30,
//!     senders: vec![SenderConfig::new("10.0.0.20", 0)
//!         .with_fixture(FixtureConfig::new(FixtureType::Rgb, 1, 8))],
//! };
//! let consumer = ArtNetConsumer::new(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration tree and validation
//! - [`dmx`] - Art-Net output pipeline
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Configuration tree and validation
pub mod config;
/// DMX output (Art-Net)
pub mod dmx;
/// Error types
pub mod error;

// Re-exports
pub use config::{ArtNetConfig, FixtureConfig, SenderConfig};
pub use dmx::{ArtNetConsumer, ComputedFixture, ComputedSender, FixtureType, TickOutcome};
pub use error::{ControlError, Result};
