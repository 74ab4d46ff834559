//! Fixture geometry compilation
//!
//! Runs once when a consumer is built. Each sender's host is resolved to a
//! socket address and each fixture group is expanded into stride-spaced
//! instances, each with its own slice of the group's bounding box. The result
//! is immutable and shared read-only with the pacing thread.

use std::net::{IpAddr, SocketAddr};
use std::ops::Range;

use lightmap_core::subdivide;
use tracing::warn;

use crate::config::{ArtNetConfig, SenderConfig};
use crate::dmx::fixtures::ComputedFixture;
use crate::dmx::UNIVERSE_SIZE;
use crate::{error::ControlError, Result};

/// A destination with its fully expanded fixtures
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedSender {
    /// Resolved destination
    pub endpoint: SocketAddr,
    /// Art-Net port-address
    pub universe: u16,
    /// Every fixture instance, in configuration order
    pub fixtures: Vec<ComputedFixture>,
}

/// Compile every sender of a validated configuration
pub fn compile_senders(config: &ArtNetConfig) -> Result<Vec<ComputedSender>> {
    config.validate()?;
    config
        .senders
        .iter()
        .enumerate()
        .map(|(index, sender)| compile_sender(index, sender))
        .collect()
}

fn compile_sender(index: usize, sender: &SenderConfig) -> Result<ComputedSender> {
    let ip: IpAddr = sender.host.parse().map_err(|e| {
        ControlError::config(format!(
            "Sender #{index}: invalid host address '{}': {e}",
            sender.host
        ))
    })?;
    let endpoint = SocketAddr::new(ip, sender.port);

    let mut fixtures = Vec::new();
    for (group, fixture) in sender.fixtures.iter().enumerate() {
        let count = usize::from(fixture.fixture_count);
        let stride = usize::from(fixture.fixture_channels);
        let start = usize::from(fixture.start_address) - 1;

        for i in 0..count {
            let address = start + i * stride;
            if address + stride > UNIVERSE_SIZE {
                return Err(ControlError::config(format!(
                    "Sender #{index} fixture #{group}: instance {i} occupies channels {}..={} \
                     beyond the {UNIVERSE_SIZE} channel universe",
                    address + 1,
                    address + stride
                )));
            }

            fixtures.push(ComputedFixture {
                fixture_type: fixture.fixture_type,
                address,
                channels: stride,
                quad: subdivide(&fixture.fixture_box, i, count),
            });
        }
    }

    warn_on_overlap(endpoint, sender.universe, &fixtures);

    Ok(ComputedSender {
        endpoint,
        universe: sender.universe,
        fixtures,
    })
}

fn warn_on_overlap(endpoint: SocketAddr, universe: u16, fixtures: &[ComputedFixture]) {
    for (a, b) in overlapping_footprints(fixtures) {
        warn!(
            %endpoint,
            universe,
            "Fixtures overlap at channels {}..={} and {}..={}",
            a.start + 1,
            a.end,
            b.start + 1,
            b.end
        );
    }
}

/// Pairs of instance footprints sharing at least one channel.
///
/// Each footprint is paired with the earlier one reaching furthest, so a wide
/// fixture is reported against every later fixture it covers.
fn overlapping_footprints(fixtures: &[ComputedFixture]) -> Vec<(Range<usize>, Range<usize>)> {
    let mut ranges: Vec<_> = fixtures.iter().map(ComputedFixture::footprint).collect();
    ranges.sort_by_key(|r| (r.start, r.end));

    let mut overlaps = Vec::new();
    let mut furthest: Option<Range<usize>> = None;
    for range in ranges {
        if let Some(prev) = furthest.as_ref().filter(|prev| range.start < prev.end) {
            overlaps.push((prev.clone(), range.clone()));
            if range.end <= prev.end {
                continue;
            }
        }
        furthest = Some(range);
    }
    overlaps
}
