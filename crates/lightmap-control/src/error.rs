//! Error types for the lighting output
use std::net::SocketAddr;

use thiserror::Error;

/// Lighting output errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Configuration rejected while building a consumer
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML parse error in a configuration tree
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parse error in a configuration tree
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Datagram could not be sent to a destination
    #[error("Send to {endpoint} failed: {source}")]
    TransportError {
        /// Destination that failed
        endpoint: SocketAddr,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// The socket accepted fewer bytes than the packet holds
    #[error("Short write to {endpoint}: sent {sent} of {expected} bytes")]
    ShortWrite {
        /// Destination that failed
        endpoint: SocketAddr,
        /// Bytes handed to the network
        sent: usize,
        /// Packet length
        expected: usize,
    },

    /// Channel data did not fit where it was written
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ControlError {
    /// Shorthand for [`ControlError::InvalidConfig`]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for errors raised while building a consumer
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::TomlError(_) | Self::JsonError(_)
        )
    }
}

/// Result type for lighting output operations
pub type Result<T> = std::result::Result<T, ControlError>;
