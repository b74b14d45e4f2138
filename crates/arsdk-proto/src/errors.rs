//! Error types for command decoding and dispatch table construction.

use thiserror::Error;

use crate::header::{FeatureUid, Opcode};

/// Result alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Failure to decode or route a single wire command.
///
/// Every variant is scoped to the one command being processed. None of them
/// leave state behind that could affect the next command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer is shorter than the fixed command header.
    #[error("command header too short: expected {expected} bytes, got {actual}")]
    HeaderTooShort {
        /// Header size in bytes
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Payload ended before a declared field could be read.
    #[error("truncated payload: {wire_type} needs {needed} bytes, {remaining} remaining")]
    TruncatedPayload {
        /// Wire type being read when the payload ran out
        wire_type: &'static str,
        /// Bytes the field requires
        needed: usize,
        /// Bytes left in the payload
        remaining: usize,
    },

    /// No feature with this UID is known to the dispatch table.
    #[error("unknown feature 0x{feature:04x}")]
    UnknownFeature {
        /// Feature UID from the command header
        feature: FeatureUid,
    },

    /// The feature is known but the opcode is not.
    #[error("unknown command {opcode} for feature 0x{feature:04x}")]
    UnknownCommand {
        /// Feature UID from the command header
        feature: FeatureUid,
        /// Opcode from the command header
        opcode: Opcode,
    },

    /// Bytes remain after every declared field was decoded.
    ///
    /// Only reported when the decode configuration rejects trailing bytes.
    #[error("{count} trailing bytes after last declared field")]
    TrailingBytes {
        /// Number of unconsumed bytes
        count: usize,
    },

    /// A string argument is not valid UTF-8.
    #[error("string argument of {len} bytes is not valid UTF-8")]
    InvalidUtf8 {
        /// Declared byte length of the string
        len: usize,
    },
}

impl DecodeError {
    /// Whether this error comes from protocol version skew between peers.
    ///
    /// Version-skew errors are expected when the device runs newer firmware
    /// than this build knows about. Callers drop the command and move on.
    /// Everything else indicates a malformed command.
    pub const fn is_version_skew(&self) -> bool {
        matches!(
            self,
            Self::UnknownFeature { .. } | Self::UnknownCommand { .. } | Self::TrailingBytes { .. }
        )
    }
}

/// Inconsistency detected while building a dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Two features declare the same UID.
    #[error("feature UID 0x{uid:04x} declared by both {existing} and {duplicate}")]
    DuplicateFeature {
        /// Conflicting UID
        uid: FeatureUid,
        /// Name of the feature registered first
        existing: &'static str,
        /// Name of the feature registered second
        duplicate: &'static str,
    },

    /// One feature declares the same opcode twice.
    #[error("feature {feature} declares opcode {opcode} more than once")]
    DuplicateOpcode {
        /// Feature name
        feature: &'static str,
        /// Conflicting opcode
        opcode: Opcode,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_skew_classification() {
        assert!(DecodeError::UnknownFeature { feature: 1 }.is_version_skew());
        assert!(DecodeError::UnknownCommand { feature: 1, opcode: 9 }.is_version_skew());
        assert!(DecodeError::TrailingBytes { count: 3 }.is_version_skew());

        assert!(
            !DecodeError::TruncatedPayload { wire_type: "i32", needed: 4, remaining: 1 }
                .is_version_skew()
        );
        assert!(!DecodeError::InvalidUtf8 { len: 2 }.is_version_skew());
        assert!(!DecodeError::HeaderTooShort { expected: 4, actual: 0 }.is_version_skew());
    }

    #[test]
    fn error_messages_name_the_feature_in_hex() {
        let err = DecodeError::UnknownCommand { feature: 0x9b00, opcode: 7 };
        assert_eq!(err.to_string(), "unknown command 7 for feature 0x9b00");
    }
}
