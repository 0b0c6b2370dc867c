//! Communication stack configuration.
//!
//! All tunable parameters of the RPC layer. Values are loaded from the
//! device's document store at boot and can be overridden by the central
//! system through configuration messages.

use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Protocol revision negotiated for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[default]
    #[serde(rename = "ocpp1.6")]
    V16,
    #[serde(rename = "ocpp2.0.1")]
    V201,
}

impl ProtocolVersion {
    /// WebSocket subprotocol name offered during the handshake.
    pub const fn subprotocol(self) -> &'static str {
        match self {
            Self::V16 => "ocpp1.6",
            Self::V201 => "ocpp2.0.1",
        }
    }

    pub fn from_subprotocol(name: &str) -> Option<Self> {
        match name {
            "ocpp1.6" => Some(Self::V16),
            "ocpp2.0.1" => Some(Self::V201),
            _ => None,
        }
    }
}

/// RPC layer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub protocol_version: ProtocolVersion,

    // --- Correlation ---
    /// Time a Call may stay unanswered before it resolves to a timeout (ms)
    pub call_timeout_ms: u32,

    // --- Framing ---
    /// Largest outbound message accepted by `send_request` (bytes)
    pub max_message_size: usize,

    // --- Logging ---
    /// Maximum level passed to the log facade by [`logging::init`](crate::logging::init)
    pub log_level: LevelFilter,
}

impl RpcConfig {
    pub const MIN_CALL_TIMEOUT_MS: u32 = 1_000;
    pub const MAX_CALL_TIMEOUT_MS: u32 = 600_000;
    pub const MIN_MESSAGE_SIZE: usize = 256;
    pub const MAX_MESSAGE_SIZE: usize = 65_536;

    /// Validate config fields are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(Self::MIN_CALL_TIMEOUT_MS..=Self::MAX_CALL_TIMEOUT_MS).contains(&self.call_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "call_timeout_ms must be 1000-600000",
            ));
        }
        if !(Self::MIN_MESSAGE_SIZE..=Self::MAX_MESSAGE_SIZE).contains(&self.max_message_size) {
            return Err(ConfigError::ValidationFailed(
                "max_message_size must be 256-65536",
            ));
        }
        Ok(())
    }

    /// Parse a stored config document and validate it.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes).map_err(|e| {
            warn!("config: stored document unreadable: {}", e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion::V16,
            call_timeout_ms: 30_000,
            max_message_size: 4096,
            log_level: LevelFilter::Info,
        }
    }
}
