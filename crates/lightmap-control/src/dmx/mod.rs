//! DMX output system
//!
//! This module turns video frames into Art-Net universes.
//!
//! ## Pipeline
//!
//! - [`compile_senders`] expands the configured fixture groups once into
//!   addressed instances with their sampling quads
//! - [`FrameMailbox`] holds the latest frame handed over by the video pipeline
//! - [`PacingLoop`] wakes at the refresh rate, samples every fixture, encodes
//!   it into its universe and sends one [`artnet`] packet per destination
//! - [`ArtNetConsumer`] ties the above to the host's frame consumer contract
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lightmap_control::dmx::ArtNetConsumer;
//! use lightmap_control::ArtNetConfig;
//! use lightmap_core::{Color, Frame, FrameConsumer, PixelFormat, VideoField, VideoFormatDesc};
//! use std::sync::Arc;
//!
//! # fn main() -> lightmap_control::Result<()> {
//! let config = ArtNetConfig::from_toml_str(r#"
//!     refresh-rate = 30
//!     [[senders]]
//!     host = "10.0.0.20"
//!     [[senders.fixtures]]
//!     start-address = 1
//!     fixture-count = 4
//!     type = "RGB"
//!     x = 960.0
//!     y = 540.0
//!     width = 1920.0
//!     height = 1080.0
//! "#)?;
//!
//! let mut consumer = ArtNetConsumer::new(config)?;
//! consumer.initialize(&VideoFormatDesc::new("1080p3000", 1920, 1080, 30.0), 1);
//!
//! let frame = Frame::solid(1920, 1080, PixelFormat::Bgra8, Color::new(255, 0, 0));
//! let _accepted = consumer.send(VideoField::Progressive, Arc::new(frame));
//! # Ok(())
//! # }
//! ```

pub mod artnet;
pub mod compile;
pub mod consumer;
pub mod fixtures;
pub mod mailbox;
pub mod scheduler;

/// Channels in one DMX universe
pub const UNIVERSE_SIZE: usize = 512;

/// Highest Art-Net port-address (15 bits)
pub const MAX_UNIVERSE: u16 = 0x7fff;

pub use artnet::{build_dmx_packet, ArtNetTransport, DmxTransport, PacketWriter};
pub use compile::{compile_senders, ComputedSender};
pub use consumer::ArtNetConsumer;
pub use fixtures::{encode, ComputedFixture, EncodedChannels, FixtureType};
pub use mailbox::FrameMailbox;
pub use scheduler::{CancellationToken, LoopStats, PacingLoop, SenderFailure, TickOutcome};
