//! Lightmap Core - Frames, Geometry and Sampling
//!
//! This crate contains the pieces shared between the video side and the
//! lighting side of Lightmap:
//! - Video frame snapshots and pixel formats
//! - Fixture bounding boxes and their subdivision into sampling quads
//! - Average color sampling over a quad
//! - The frame consumer contract a host pipeline drives
//! - Logging configuration

#![warn(missing_docs)]

use thiserror::Error;

pub mod consumer;
pub mod frame;
pub mod geometry;
pub mod logging;
pub mod sampler;

// Frames & Colors
pub use frame::{Color, Frame, PixelFormat};

// Geometry
pub use geometry::{subdivide, FixtureBox, Quad};

// Sampling
pub use sampler::average_color;

// Host contract
pub use consumer::{FrameConsumer, MonitorState, VideoField, VideoFormatDesc};

// Logging & Diagnostics
pub use logging::LogConfig;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Pixel buffer does not match the frame dimensions
    #[error("Frame size mismatch: expected {expected} bytes, got {actual} bytes")]
    FrameSizeMismatch {
        /// Expected buffer size in bytes
        expected: usize,
        /// Actual buffer size in bytes
        actual: usize,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
