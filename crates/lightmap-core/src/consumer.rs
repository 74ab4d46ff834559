//! Frame consumer contract
//!
//! The video pipeline drives every output through [`FrameConsumer`]. It calls
//! `initialize` once the channel format is known, then `send` for every
//! rendered field. Consumers must never block the pipeline: `send` hands back
//! a future that the pipeline may await or drop.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Which field of an interlaced frame is being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoField {
    /// Full progressive frame
    #[default]
    Progressive,
    /// Upper field
    A,
    /// Lower field
    B,
}

/// Format of the video channel a consumer is attached to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFormatDesc {
    /// Human readable format name, e.g. `1080p5000`
    pub name: String,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: f64,
}

impl VideoFormatDesc {
    /// Create a progressive format description
    pub fn new(name: impl Into<String>, width: u32, height: u32, fps: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            fps,
        }
    }
}

/// Diagnostics snapshot reported by a consumer, keyed by path
pub type MonitorState = BTreeMap<String, serde_json::Value>;

/// An output that receives rendered frames from the video pipeline
pub trait FrameConsumer: Send + Sync {
    /// Prepare for frames of `format_desc` on channel `channel_index`
    fn initialize(&mut self, format_desc: &VideoFormatDesc, channel_index: usize);

    /// Hand over a frame; resolves to `true` once accepted
    fn send(&self, field: VideoField, frame: Arc<Frame>) -> BoxFuture<'static, bool>;

    /// Short consumer name
    fn name(&self) -> &str;

    /// Descriptive label used in logs
    fn print(&self) -> String;

    /// Stable index used to order consumers on a channel
    fn index(&self) -> i32;

    /// Current diagnostics
    fn state(&self) -> MonitorState;
}
