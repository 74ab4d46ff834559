//! Art-Net protocol implementation (ArtDmx)
//!
//! Art-Net is a UDP-based protocol for transmitting DMX512 over Ethernet.
//! Every packet carries a full 512-channel universe; sequencing is disabled.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use crate::dmx::UNIVERSE_SIZE;
use crate::{error::ControlError, Result};

/// Default Art-Net UDP port
pub const ARTNET_PORT: u16 = 6454;

/// Packet identifier, NUL terminated
pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

/// OpDmx opcode
pub const OP_DMX: u16 = 0x5000;

/// Art-Net protocol revision
pub const PROTOCOL_VERSION: u16 = 14;

/// Size of the ArtDmx header
pub const HEADER_LEN: usize = 18;

/// Size of a complete ArtDmx packet
pub const PACKET_LEN: usize = HEADER_LEN + UNIVERSE_SIZE;

/// A framed ArtDmx packet
pub type ArtDmxPacket = [u8; PACKET_LEN];

/// Bounds-checked sequential writer over a packet buffer
pub struct PacketWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> PacketWriter<'a> {
    /// Start writing at the beginning of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Append raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        let capacity = self.buf.len();
        let dst = self.buf.get_mut(self.pos..end).ok_or_else(|| {
            ControlError::EncodingError(format!(
                "packet field at offset {} with {} bytes exceeds {} byte packet",
                self.pos,
                bytes.len(),
                capacity
            ))
        })?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Append one byte
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.put_bytes(&[value])
    }

    /// Append a 16-bit value, low byte first
    pub fn put_u16_le(&mut self, value: u16) -> Result<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Append a 16-bit value, high byte first
    pub fn put_u16_be(&mut self, value: u16) -> Result<()> {
        self.put_bytes(&value.to_be_bytes())
    }
}

/// Build an ArtDmx packet for `universe` carrying `channels`
pub fn build_dmx_packet(universe: u16, channels: &[u8; UNIVERSE_SIZE]) -> Result<ArtDmxPacket> {
    let mut packet = [0u8; PACKET_LEN];
    let mut writer = PacketWriter::new(&mut packet);

    writer.put_bytes(ARTNET_ID)?;
    writer.put_u16_le(OP_DMX)?;
    writer.put_u16_be(PROTOCOL_VERSION)?;
    // Sequence (0 = disabled)
    writer.put_u8(0)?;
    // Physical input port
    writer.put_u8(0)?;
    // Port-Address, low byte first
    writer.put_u16_le(universe)?;
    // Data length, high byte first
    writer.put_u16_be(UNIVERSE_SIZE as u16)?;
    writer.put_bytes(channels)?;

    debug_assert_eq!(writer.position(), PACKET_LEN);
    Ok(packet)
}

/// Outbound datagram sink for framed packets
pub trait DmxTransport: Send + Sync {
    /// Send one packet to `endpoint`, without retrying
    fn send_packet(&self, packet: &[u8], endpoint: SocketAddr) -> Result<()>;
}

impl DmxTransport for Arc<dyn DmxTransport> {
    fn send_packet(&self, packet: &[u8], endpoint: SocketAddr) -> Result<()> {
        (**self).send_packet(packet, endpoint)
    }
}

/// UDP transport shared by every destination of a consumer
pub struct ArtNetTransport {
    socket_v4: UdpSocket,
    socket_v6: Option<UdpSocket>,
}

impl ArtNetTransport {
    /// Open the outbound socket(s) for the given destinations.
    ///
    /// An IPv4 socket is always opened; an IPv6 one only when a destination
    /// needs it.
    pub fn bind<'a>(endpoints: impl IntoIterator<Item = &'a SocketAddr>) -> Result<Self> {
        let socket_v4 = UdpSocket::bind("0.0.0.0:0")?;
        socket_v4.set_broadcast(true)?;

        let socket_v6 = if endpoints.into_iter().any(SocketAddr::is_ipv6) {
            Some(UdpSocket::bind("[::]:0")?)
        } else {
            None
        };

        tracing::info!(
            "Art-Net transport bound to {}",
            socket_v4.local_addr()?
        );

        Ok(Self {
            socket_v4,
            socket_v6,
        })
    }

    fn socket_for(&self, endpoint: &SocketAddr) -> &UdpSocket {
        match (endpoint, &self.socket_v6) {
            (SocketAddr::V6(_), Some(socket)) => socket,
            _ => &self.socket_v4,
        }
    }
}

impl DmxTransport for ArtNetTransport {
    fn send_packet(&self, packet: &[u8], endpoint: SocketAddr) -> Result<()> {
        let sent = self
            .socket_for(&endpoint)
            .send_to(packet, endpoint)
            .map_err(|source| ControlError::TransportError { endpoint, source })?;

        if sent != packet.len() {
            return Err(ControlError::ShortWrite {
                endpoint,
                sent,
                expected: packet.len(),
            });
        }

        tracing::trace!("Sent {} byte Art-Net packet to {}", sent, endpoint);
        Ok(())
    }
}
