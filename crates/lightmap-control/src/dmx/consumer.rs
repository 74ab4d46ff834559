//! Art-Net frame consumer
//!
//! Plugs the pacing loop into the host's [`FrameConsumer`] contract. All
//! geometry is compiled and the socket opened in [`ArtNetConsumer::new`], so
//! a bad configuration is rejected before any thread exists. The pacing
//! thread starts in `initialize` and is stopped and joined on drop, before
//! the socket is released.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use futures::future::{self, BoxFuture, FutureExt};
use lightmap_core::{Frame, FrameConsumer, MonitorState, VideoField, VideoFormatDesc};
use parking_lot::RwLock;
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::ArtNetConfig;
use crate::dmx::artnet::{ArtNetTransport, DmxTransport};
use crate::dmx::compile::{compile_senders, ComputedSender};
use crate::dmx::mailbox::FrameMailbox;
use crate::dmx::scheduler::{CancellationToken, LoopStats, PacingLoop};
use crate::Result;

/// Index reported to the host's consumer ordering
pub const ARTNET_CONSUMER_INDEX: i32 = 1337;

/// Streams the latest video frame to Art-Net fixtures
pub struct ArtNetConsumer {
    config: ArtNetConfig,
    senders: Arc<[ComputedSender]>,
    mailbox: Arc<FrameMailbox>,
    stats: Arc<RwLock<LoopStats>>,
    transport: Arc<dyn DmxTransport>,
    token: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl ArtNetConsumer {
    /// Validate `config`, compile its geometry and open the UDP socket
    pub fn new(config: ArtNetConfig) -> Result<Self> {
        let senders = compile_senders(&config)?;
        let transport = ArtNetTransport::bind(senders.iter().map(|s| &s.endpoint))?;

        info!(
            "Art-Net consumer created: {} senders, {} fixtures at {} Hz",
            senders.len(),
            senders.iter().map(|s| s.fixtures.len()).sum::<usize>(),
            config.refresh_rate
        );

        Ok(Self {
            config,
            senders: senders.into(),
            mailbox: Arc::new(FrameMailbox::new()),
            stats: Arc::new(RwLock::new(LoopStats::default())),
            transport: Arc::new(transport),
            token: CancellationToken::new(),
            worker: None,
        })
    }

    /// The validated configuration
    pub fn config(&self) -> &ArtNetConfig {
        &self.config
    }

    /// Compiled destinations
    pub fn senders(&self) -> &[ComputedSender] {
        &self.senders
    }

    /// Total fixture instances over all destinations
    pub fn fixture_count(&self) -> usize {
        self.senders.iter().map(|s| s.fixtures.len()).sum()
    }

    /// Snapshot of the pacing loop counters
    pub fn stats(&self) -> LoopStats {
        *self.stats.read()
    }

    /// The frame the next tick will sample
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.mailbox.latest()
    }

    /// Whether the pacing thread is running
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    fn start(&mut self, builder: thread::Builder) {
        if self.worker.is_some() {
            warn!("Art-Net consumer already initialized");
            return;
        }

        let pacing = PacingLoop::new(
            self.senders.clone(),
            self.mailbox.clone(),
            self.transport.clone(),
            self.config.refresh_rate,
            self.stats.clone(),
        );
        let token = self.token.clone();

        // On failure the worker stays unset, so a later initialize can retry
        match builder.spawn(move || pacing.run(token)) {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => error!("Failed to spawn Art-Net pacing thread: {}", e),
        }
    }
}

impl FrameConsumer for ArtNetConsumer {
    fn initialize(&mut self, format_desc: &VideoFormatDesc, channel_index: usize) {
        info!(
            "Art-Net consumer initialized on channel {} ({})",
            channel_index, format_desc.name
        );
        self.start(thread::Builder::new().name("artnet-pacing".to_string()));
    }

    fn send(&self, _field: VideoField, frame: Arc<Frame>) -> BoxFuture<'static, bool> {
        self.mailbox.deliver(frame);
        future::ready(true).boxed()
    }

    fn name(&self) -> &str {
        "artnet"
    }

    fn print(&self) -> String {
        "artnet[]".to_string()
    }

    fn index(&self) -> i32 {
        ARTNET_CONSUMER_INDEX
    }

    fn state(&self) -> MonitorState {
        let stats = self.stats();
        let mut state = MonitorState::new();
        state.insert("artnet/senders".into(), json!(self.config.senders.len()));
        state.insert("artnet/computed-senders".into(), json!(self.senders.len()));
        state.insert("artnet/computed-fixtures".into(), json!(self.fixture_count()));
        state.insert("artnet/refresh-rate".into(), json!(self.config.refresh_rate));
        state.insert("artnet/ticks".into(), json!(stats.ticks));
        state.insert("artnet/skipped-ticks".into(), json!(stats.skipped_ticks));
        state.insert("artnet/packets-sent".into(), json!(stats.packets_sent));
        state.insert("artnet/send-errors".into(), json!(stats.send_errors));
        state.insert(
            "artnet/frames-delivered".into(),
            json!(self.mailbox.delivered()),
        );
        state
    }
}

impl Drop for ArtNetConsumer {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Art-Net pacing thread panicked");
            }
        }
    }
}
