//! Fixed-rate pacing loop
//!
//! The loop wakes once per refresh period, takes the latest frame from the
//! mailbox and sends one packet to every destination. Pacing is single-sample:
//! the sleep before each tick is the period minus the time since the previous
//! tick started, and a late tick runs immediately without catching up.
//!
//! Errors never stop the loop. Each destination is encoded and sent on its
//! own, and the outcome of a tick is reported as a [`TickOutcome`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use lightmap_core::{average_color, Frame};
use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::dmx::artnet::{build_dmx_packet, DmxTransport};
use crate::dmx::compile::ComputedSender;
use crate::dmx::mailbox::FrameMailbox;
use crate::dmx::UNIVERSE_SIZE;
use crate::error::ControlError;

/// Cooperative stop signal shared between a consumer and its pacing thread
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Request a stop and wake a pending [`wait`](Self::wait)
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.wake_tx.try_send(());
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for up to `timeout`; returns true if cancelled meanwhile
    pub fn wait(&self, timeout: Duration) -> bool {
        // A wake message, a timeout and a disconnect all end the wait
        let _ = self.wake_rx.recv_timeout(timeout);
        self.is_cancelled()
    }
}

/// Counters for the pacing loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks run, including skipped ones
    pub ticks: u64,
    /// Ticks without a frame to sample
    pub skipped_ticks: u64,
    /// Packets handed to the transport
    pub packets_sent: u64,
    /// Destinations that failed, summed over ticks
    pub send_errors: u64,
}

/// A destination that could not be served in a tick
#[derive(Debug)]
pub struct SenderFailure {
    /// Position of the sender in the configuration
    pub sender_index: usize,
    pub endpoint: SocketAddr,
    pub universe: u16,
    pub error: ControlError,
}

/// Result of a single tick
#[derive(Debug)]
pub enum TickOutcome {
    /// No frame has been delivered yet
    NoFrame,
    /// Every destination received its packet
    Sent { packets: usize },
    /// Some destinations failed; the rest were sent
    Degraded {
        packets: usize,
        failures: Vec<SenderFailure>,
    },
}

/// Pacing loop state, owned by the pacing thread
pub struct PacingLoop<T> {
    senders: Arc<[ComputedSender]>,
    mailbox: Arc<FrameMailbox>,
    transport: T,
    period: Duration,
    stats: Arc<RwLock<LoopStats>>,
    universes: Vec<[u8; UNIVERSE_SIZE]>,
    failing: Vec<bool>,
}

/// Tick period for a refresh rate in Hz, whole milliseconds, at least 1 ms
pub fn tick_period(refresh_rate: u32) -> Duration {
    Duration::from_millis(u64::from(1000 / refresh_rate.max(1)).max(1))
}

impl<T: DmxTransport> PacingLoop<T> {
    /// Create a loop over precompiled senders
    pub fn new(
        senders: Arc<[ComputedSender]>,
        mailbox: Arc<FrameMailbox>,
        transport: T,
        refresh_rate: u32,
        stats: Arc<RwLock<LoopStats>>,
    ) -> Self {
        let count = senders.len();
        Self {
            senders,
            mailbox,
            transport,
            period: tick_period(refresh_rate),
            stats,
            universes: vec![[0u8; UNIVERSE_SIZE]; count],
            failing: vec![false; count],
        }
    }

    /// Run until `token` is cancelled
    pub fn run(mut self, token: CancellationToken) {
        info!(
            "Art-Net pacing loop started: {} senders every {:?}",
            self.senders.len(),
            self.period
        );

        let mut last_tick = Instant::now();
        while !token.is_cancelled() {
            let elapsed = last_tick.elapsed();
            if let Some(remaining) = self.period.checked_sub(elapsed) {
                if !remaining.is_zero() && token.wait(remaining) {
                    break;
                }
            }
            last_tick = Instant::now();

            let outcome = self.tick();
            self.report(&outcome);
        }

        info!("Art-Net pacing loop stopped");
    }

    /// Run one tick against the mailbox's latest frame
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = match self.mailbox.latest() {
            Some(frame) => self.send_frame(&frame),
            None => TickOutcome::NoFrame,
        };
        self.record(&outcome);
        outcome
    }

    /// Sample, encode and send `frame` to every destination
    pub fn send_frame(&mut self, frame: &Frame) -> TickOutcome {
        let mut packets = 0;
        let mut failures = Vec::new();

        let universes = self.universes.iter_mut();
        for (sender_index, (sender, universe)) in self.senders.iter().zip(universes).enumerate() {
            match send_universe(&self.transport, sender, universe, frame) {
                Ok(()) => packets += 1,
                Err(error) => failures.push(SenderFailure {
                    sender_index,
                    endpoint: sender.endpoint,
                    universe: sender.universe,
                    error,
                }),
            }
        }

        if failures.is_empty() {
            TickOutcome::Sent { packets }
        } else {
            TickOutcome::Degraded { packets, failures }
        }
    }

    fn record(&self, outcome: &TickOutcome) {
        let mut stats = self.stats.write();
        stats.ticks += 1;
        match outcome {
            TickOutcome::NoFrame => stats.skipped_ticks += 1,
            TickOutcome::Sent { packets } => stats.packets_sent += *packets as u64,
            TickOutcome::Degraded { packets, failures } => {
                stats.packets_sent += *packets as u64;
                stats.send_errors += failures.len() as u64;
            }
        }
    }

    // Warn once when a destination starts failing and once when it recovers
    fn report(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::NoFrame => trace!("No frame available, skipping tick"),
            TickOutcome::Sent { packets } => trace!("Sent {} Art-Net packets", packets),
            TickOutcome::Degraded { packets, failures } => {
                debug!(
                    "Sent {} Art-Net packets, {} destinations failed",
                    packets,
                    failures.len()
                );
            }
        }

        let failed: &[SenderFailure] = match outcome {
            TickOutcome::Degraded { failures, .. } => failures,
            TickOutcome::Sent { .. } => &[],
            TickOutcome::NoFrame => return,
        };

        let senders = self.senders.iter().zip(self.failing.iter_mut());
        for (index, (sender, failing)) in senders.enumerate() {
            let failure = failed.iter().find(|f| f.sender_index == index);
            match (failure, *failing) {
                (Some(f), false) => {
                    warn!(endpoint = %f.endpoint, universe = f.universe, "Art-Net send failed: {}", f.error);
                    *failing = true;
                }
                (Some(f), true) => {
                    debug!(endpoint = %f.endpoint, universe = f.universe, "Art-Net send still failing: {}", f.error);
                }
                (None, true) => {
                    info!(endpoint = %sender.endpoint, universe = sender.universe, "Art-Net destination recovered");
                    *failing = false;
                }
                (None, false) => {}
            }
        }
    }
}

fn send_universe<T: DmxTransport>(
    transport: &T,
    sender: &ComputedSender,
    universe: &mut [u8; UNIVERSE_SIZE],
    frame: &Frame,
) -> crate::Result<()> {
    universe.fill(0);
    for fixture in &sender.fixtures {
        let color = average_color(frame, &fixture.quad);
        fixture.write(universe, color)?;
    }

    let packet = build_dmx_packet(sender.universe, universe)?;
    transport.send_packet(&packet, sender.endpoint)
}
