//! Decode configuration.

use serde::{Deserialize, Serialize};

/// What to do with bytes left over after the last declared field.
///
/// Newer protocol versions may append fields to an existing command. Older
/// decoders ignore them by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingBytesPolicy {
    /// Decode the known fields and drop the rest
    #[default]
    Ignore,
    /// Fail the command with `TrailingBytes`
    Reject,
}

/// Decode behavior shared by every command routed through a dispatch table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Handling of unconsumed payload bytes
    pub trailing_bytes: TrailingBytesPolicy,
}

impl DecodeConfig {
    /// Configuration that rejects payloads with trailing bytes.
    pub const fn strict() -> Self {
        Self { trailing_bytes: TrailingBytesPolicy::Reject }
    }
}
