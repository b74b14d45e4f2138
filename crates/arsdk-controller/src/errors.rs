//! Application layer errors.

use arsdk_proto::{DecodeError, TableError};
use thiserror::Error;

/// Result type for router operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors surfaced by [`crate::CommandRouter`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// A thread panicked while mutating the callback registry.
    #[error("callback registry lock poisoned")]
    RegistryPoisoned,

    /// An inbound command could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The dispatch table was built from conflicting features.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A command given as text was not valid hex.
    #[error("invalid hex command: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl ControllerError {
    /// Whether the command was well-formed for a newer protocol revision.
    pub fn is_version_skew(&self) -> bool {
        matches!(self, Self::Decode(err) if err.is_version_skew())
    }
}
