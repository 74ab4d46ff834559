//! Latest-wins frame handoff between the video pipeline and the pacing loop

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use lightmap_core::Frame;

/// Single-slot frame holder.
///
/// Every delivery replaces the held snapshot; frames delivered between two
/// reads are dropped. Both sides are lock-free.
#[derive(Debug)]
pub struct FrameMailbox {
    slot: ArcSwapOption<Frame>,
    delivered: AtomicU64,
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameMailbox {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            delivered: AtomicU64::new(0),
        }
    }

    /// Replace the held frame
    pub fn deliver(&self, frame: Arc<Frame>) {
        self.slot.store(Some(frame));
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// The most recently delivered frame, if any
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.slot.load_full()
    }

    /// Number of deliveries so far
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}
