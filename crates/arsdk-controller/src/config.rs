//! Router configuration.

use arsdk_proto::DecodeConfig;
use serde::{Deserialize, Serialize};

/// How a [`crate::CommandRouter`] decodes and reports inbound commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Engine decode options
    pub decode: DecodeConfig,
    /// Return version-skew errors to the caller instead of dropping the
    /// command with `Ok(None)`.
    pub surface_version_skew: bool,
}

impl RouterConfig {
    /// Reject trailing bytes and surface every failure.
    pub const fn strict() -> Self {
        Self { decode: DecodeConfig::strict(), surface_version_skew: true }
    }
}

#[cfg(test)]
mod tests {
    use arsdk_proto::TrailingBytesPolicy;

    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config: RouterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.decode.trailing_bytes, TrailingBytesPolicy::Ignore);
        assert!(!config.surface_version_skew);
    }

    #[test]
    fn nested_decode_options() {
        let config: RouterConfig = serde_json::from_str(
            r#"{ "decode": { "trailing_bytes": "reject" }, "surface_version_skew": true }"#,
        )
        .unwrap();
        assert_eq!(config, RouterConfig::strict());
    }
}
