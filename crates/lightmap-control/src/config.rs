//! Art-Net output configuration
//!
//! The host hands over a configuration tree with kebab-case keys:
//!
//! ```toml
//! refresh-rate = 30
//!
//! [[senders]]
//! host = "10.0.0.20"
//! port = 6454
//! universe = 0
//!
//! [[senders.fixtures]]
//! start-address = 1
//! fixture-count = 8
//! type = "rgbw"
//! fixture-channels = 6
//! x = 960.0
//! y = 1000.0
//! width = 1920.0
//! height = 80.0
//! ```
//!
//! Parsing happens in two steps. The tree is first deserialized into the
//! loosely typed `Raw*` structs, where every field is optional, and then
//! converted into [`ArtNetConfig`] so that each missing or invalid value is
//! reported with a readable message instead of a serde type error.

use std::path::Path;

use lightmap_core::FixtureBox;
use serde::Deserialize;

use crate::dmx::{artnet::ARTNET_PORT, FixtureType, MAX_UNIVERSE};
use crate::{error::ControlError, Result};

/// Refresh rate used when the tree does not set one
pub const DEFAULT_REFRESH_RATE: u32 = 10;

/// Validated Art-Net output configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ArtNetConfig {
    /// Packets per second per destination
    pub refresh_rate: u32,
    /// Destinations
    pub senders: Vec<SenderConfig>,
}

/// One destination universe
#[derive(Debug, Clone, PartialEq)]
pub struct SenderConfig {
    /// IP address literal of the receiving node
    pub host: String,
    /// UDP port of the receiving node
    pub port: u16,
    /// Art-Net port-address
    pub universe: u16,
    /// Fixtures patched into this universe
    pub fixtures: Vec<FixtureConfig>,
}

/// A group of identical fixtures sharing one bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureConfig {
    /// Color model
    pub fixture_type: FixtureType,
    /// First channel of the first instance, 1-based
    pub start_address: u16,
    /// Number of instances
    pub fixture_count: u16,
    /// Channel stride between instances
    pub fixture_channels: u16,
    /// Screen area split across the instances
    pub fixture_box: FixtureBox,
}

impl Default for ArtNetConfig {
    fn default() -> Self {
        Self {
            refresh_rate: DEFAULT_REFRESH_RATE,
            senders: Vec::new(),
        }
    }
}

impl FixtureConfig {
    /// Fixture group with the default stride for its type
    pub fn new(fixture_type: FixtureType, start_address: u16, fixture_count: u16) -> Self {
        Self {
            fixture_type,
            start_address,
            fixture_count,
            fixture_channels: fixture_type.min_channels() as u16,
            fixture_box: FixtureBox::default(),
        }
    }

    /// Set the channel stride
    pub fn with_channels(mut self, fixture_channels: u16) -> Self {
        self.fixture_channels = fixture_channels;
        self
    }

    /// Set the bounding box
    pub fn with_box(mut self, fixture_box: FixtureBox) -> Self {
        self.fixture_box = fixture_box;
        self
    }
}

impl SenderConfig {
    /// Destination on the default Art-Net port
    pub fn new(host: impl Into<String>, universe: u16) -> Self {
        Self {
            host: host.into(),
            port: ARTNET_PORT,
            universe,
            fixtures: Vec::new(),
        }
    }

    /// Add a fixture group
    pub fn with_fixture(mut self, fixture: FixtureConfig) -> Self {
        self.fixtures.push(fixture);
        self
    }
}

impl ArtNetConfig {
    /// Parse and validate a TOML tree
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(s)?;
        raw.try_into()
    }

    /// Parse and validate a JSON tree
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(s)?;
        raw.try_into()
    }

    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ControlError::config(format!(
                "Unsupported configuration format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Check the invariants that hold for any accepted configuration
    pub fn validate(&self) -> Result<()> {
        if self.refresh_rate < 1 {
            return Err(ControlError::config("Refresh rate must be at least 1"));
        }

        for (s, sender) in self.senders.iter().enumerate() {
            if sender.port == 0 {
                return Err(ControlError::config(format!(
                    "Sender #{s}: port must be between 1 and 65535"
                )));
            }
            if sender.universe > MAX_UNIVERSE {
                return Err(ControlError::config(format!(
                    "Sender #{s}: universe {} exceeds {MAX_UNIVERSE}",
                    sender.universe
                )));
            }

            for (f, fixture) in sender.fixtures.iter().enumerate() {
                let ctx = format!("Sender #{s} fixture #{f}");
                if fixture.start_address < 1 {
                    return Err(ControlError::config(format!(
                        "{ctx}: start address must be at least 1"
                    )));
                }
                if fixture.fixture_count < 1 {
                    return Err(ControlError::config(format!(
                        "{ctx}: fixture count must be at least 1"
                    )));
                }
                if usize::from(fixture.fixture_channels) < fixture.fixture_type.min_channels() {
                    return Err(ControlError::config(format!(
                        "{ctx}: fixture channel count {} is not enough for {} (needs {})",
                        fixture.fixture_channels,
                        fixture.fixture_type,
                        fixture.fixture_type.min_channels()
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Configuration tree as deserialized, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawConfig {
    pub refresh_rate: Option<i64>,
    #[serde(default)]
    pub senders: Vec<RawSender>,
}

/// Sender entry as deserialized
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawSender {
    pub host: Option<String>,
    pub port: Option<i64>,
    pub universe: Option<i64>,
    #[serde(default)]
    pub fixtures: Vec<RawFixture>,
}

/// Fixture entry as deserialized
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawFixture {
    pub start_address: Option<i64>,
    pub fixture_count: Option<i64>,
    #[serde(rename = "type")]
    pub fixture_type: Option<String>,
    pub fixture_channels: Option<i64>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub rotation: f32,
}

impl TryFrom<RawConfig> for ArtNetConfig {
    type Error = ControlError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let refresh_rate = raw.refresh_rate.unwrap_or(i64::from(DEFAULT_REFRESH_RATE));
        if refresh_rate < 1 {
            return Err(ControlError::config("Refresh rate must be at least 1"));
        }
        let refresh_rate = int_in_range(refresh_rate, 1, u32::MAX.into(), "Refresh rate")?;

        let senders = raw
            .senders
            .into_iter()
            .enumerate()
            .map(|(s, sender)| convert_sender(s, sender))
            .collect::<Result<Vec<_>>>()?;

        let config = Self {
            refresh_rate,
            senders,
        };
        config.validate()?;
        Ok(config)
    }
}

fn convert_sender(index: usize, raw: RawSender) -> Result<SenderConfig> {
    let ctx = format!("Sender #{index}");
    let host = raw
        .host
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| ControlError::config(format!("{ctx}: host must be specified")))?;
    let port = int_in_range(
        raw.port.unwrap_or(i64::from(ARTNET_PORT)),
        1,
        u16::MAX.into(),
        &format!("{ctx}: port"),
    )?;
    let universe = int_in_range(
        raw.universe.unwrap_or(0),
        0,
        MAX_UNIVERSE.into(),
        &format!("{ctx}: universe"),
    )?;

    let fixtures = raw
        .fixtures
        .into_iter()
        .enumerate()
        .map(|(f, fixture)| convert_fixture(&format!("{ctx} fixture #{f}"), fixture))
        .collect::<Result<Vec<_>>>()?;

    Ok(SenderConfig {
        host: host.trim().to_string(),
        port,
        universe,
        fixtures,
    })
}

fn convert_fixture(ctx: &str, raw: RawFixture) -> Result<FixtureConfig> {
    let start_address = match raw.start_address {
        Some(address) if address >= 1 => {
            int_in_range(address, 1, u16::MAX.into(), &format!("{ctx}: start address"))?
        }
        _ => {
            return Err(ControlError::config(format!(
                "{ctx}: fixture start address must be specified"
            )))
        }
    };

    let fixture_count = match raw.fixture_count {
        Some(count) if count >= 1 => {
            int_in_range(count, 1, u16::MAX.into(), &format!("{ctx}: fixture count"))?
        }
        _ => {
            return Err(ControlError::config(format!(
                "{ctx}: fixture count must be specified"
            )))
        }
    };

    let fixture_type: FixtureType = match raw.fixture_type.as_deref().map(str::trim) {
        None | Some("") => {
            return Err(ControlError::config(format!(
                "{ctx}: fixture type must be specified"
            )))
        }
        Some(name) => name
            .parse()
            .map_err(|e: ControlError| ControlError::config(format!("{ctx}: {e}")))?,
    };

    let min_channels = fixture_type.min_channels() as u16;
    let fixture_channels = match raw.fixture_channels {
        None => min_channels,
        Some(channels) if channels < i64::from(min_channels) => {
            return Err(ControlError::config(format!(
                "{ctx}: fixture channel count must be at least {min_channels} for {fixture_type}"
            )))
        }
        Some(channels) => int_in_range(
            channels,
            min_channels.into(),
            u16::MAX.into(),
            &format!("{ctx}: fixture channels"),
        )?,
    };

    Ok(FixtureConfig {
        fixture_type,
        start_address,
        fixture_count,
        fixture_channels,
        fixture_box: FixtureBox {
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            rotation: raw.rotation,
        },
    })
}

fn int_in_range<T: TryFrom<i64>>(value: i64, min: i64, max: i64, what: &str) -> Result<T> {
    if value < min || value > max {
        return Err(ControlError::config(format!(
            "{what} {value} is out of range {min}..={max}"
        )));
    }
    T::try_from(value)
        .map_err(|_| ControlError::config(format!("{what} {value} is out of range")))
}
