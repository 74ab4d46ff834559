//! Fixture color models and channel encoding

use std::fmt;
use std::str::FromStr;

use lightmap_core::{Color, Quad};

use crate::dmx::UNIVERSE_SIZE;
use crate::{error::ControlError, Result};

/// Color model of a fixture, which fixes its channel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureType {
    /// Single intensity channel
    Dimmer,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue, white
    Rgbw,
}

impl FixtureType {
    /// Number of channels the color model writes
    pub const fn min_channels(self) -> usize {
        match self {
            FixtureType::Dimmer => 1,
            FixtureType::Rgb => 3,
            FixtureType::Rgbw => 4,
        }
    }
}

impl FromStr for FixtureType {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DIMMER" => Ok(FixtureType::Dimmer),
            "RGB" => Ok(FixtureType::Rgb),
            "RGBW" => Ok(FixtureType::Rgbw),
            _ => Err(ControlError::config(format!("Unknown fixture type '{s}'"))),
        }
    }
}

impl fmt::Display for FixtureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixtureType::Dimmer => "DIMMER",
            FixtureType::Rgb => "RGB",
            FixtureType::Rgbw => "RGBW",
        };
        f.write_str(name)
    }
}

/// Channel bytes produced for one fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedChannels {
    bytes: [u8; 4],
    len: usize,
}

impl EncodedChannels {
    /// The encoded channel values
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Encode a color for the given color model.
///
/// - Dimmer: weighted luma `0.279 r + 0.547 g + 0.106 b`, truncated
/// - RGB: passed through
/// - RGBW: the common part of r, g and b moves to the white channel
pub fn encode(fixture_type: FixtureType, color: Color) -> EncodedChannels {
    let Color { r, g, b } = color;
    match fixture_type {
        FixtureType::Dimmer => {
            let luma = 0.279 * f64::from(r) + 0.547 * f64::from(g) + 0.106 * f64::from(b);
            // Weights sum to 0.932, so luma stays below 256
            EncodedChannels {
                bytes: [luma as u8, 0, 0, 0],
                len: 1,
            }
        }
        FixtureType::Rgb => EncodedChannels {
            bytes: [r, g, b, 0],
            len: 3,
        },
        FixtureType::Rgbw => {
            let w = r.min(g).min(b);
            EncodedChannels {
                bytes: [r - w, g - w, b - w, w],
                len: 4,
            }
        }
    }
}

/// One addressed fixture instance with its sampling area
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedFixture {
    /// Color model
    pub fixture_type: FixtureType,
    /// Zero-based first channel inside the universe
    pub address: usize,
    /// Channels reserved for this instance
    pub channels: usize,
    /// Screen area averaged for this instance
    pub quad: Quad,
}

impl ComputedFixture {
    /// Channel range reserved by this instance
    pub fn footprint(&self) -> std::ops::Range<usize> {
        self.address..self.address + self.channels
    }

    /// Encode `color` and write it at this fixture's address
    pub fn write(&self, universe: &mut [u8; UNIVERSE_SIZE], color: Color) -> Result<()> {
        let encoded = encode(self.fixture_type, color);
        let bytes = encoded.as_slice();
        let end = self.address + bytes.len();
        let slot = universe.get_mut(self.address..end).ok_or_else(|| {
            ControlError::EncodingError(format!(
                "{} fixture at channel {} needs channels up to {}, universe has {}",
                self.fixture_type,
                self.address + 1,
                end,
                UNIVERSE_SIZE
            ))
        })?;
        slot.copy_from_slice(bytes);
        Ok(())
    }
}
