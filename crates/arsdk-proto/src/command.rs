//! Wire command buffer.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    errors::Result,
    header::{CommandHeader, FeatureUid, Opcode},
};

/// One encoded command: header plus argument payload.
///
/// Immutable once built. The payload is reference counted, so cloning a
/// command or parsing one out of a received buffer does not copy arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireCommand {
    header: CommandHeader,
    payload: Bytes,
}

impl WireCommand {
    /// Assemble a command from its parts.
    pub fn new(feature: FeatureUid, opcode: Opcode, payload: impl Into<Bytes>) -> Self {
        Self { header: CommandHeader::new(feature, opcode), payload: payload.into() }
    }

    /// Parse a command received from the transport.
    ///
    /// # Errors
    ///
    /// Returns `HeaderTooShort` if `bytes` cannot hold a header.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        let header = *CommandHeader::from_bytes(&bytes)?;
        Ok(Self { header, payload: bytes.slice(CommandHeader::SIZE..) })
    }

    /// Command header.
    pub fn header(&self) -> &CommandHeader {
        &self.header
    }

    /// Feature UID.
    pub fn feature(&self) -> FeatureUid {
        self.header.feature()
    }

    /// Opcode within the feature.
    pub fn opcode(&self) -> Opcode {
        self.header.opcode()
    }

    /// Argument payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Total encoded size, header included.
    pub fn encoded_len(&self) -> usize {
        CommandHeader::SIZE + self.payload.len()
    }

    /// Transport form: header followed by payload.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.encoded_len());
        out.put_slice(&self.header.to_bytes());
        out.put_slice(&self.payload);
        out.freeze()
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::errors::DecodeError;

    #[test]
    fn parse_splits_header_and_payload() {
        let command = WireCommand::from_bytes(hex!("009b 0100 2a000000").to_vec()).unwrap();
        assert_eq!(command.feature(), 0x9b00);
        assert_eq!(command.opcode(), 1);
        assert_eq!(command.payload(), &hex!("2a000000"));
        assert_eq!(command.encoded_len(), 8);
    }

    #[test]
    fn header_only_command_has_empty_payload() {
        let command = WireCommand::from_bytes(hex!("009b0200").to_vec()).unwrap();
        assert!(command.payload().is_empty());
        assert_eq!(command.to_bytes().as_ref(), &hex!("009b0200"));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = WireCommand::from_bytes(vec![0x00]).unwrap_err();
        assert_eq!(err, DecodeError::HeaderTooShort { expected: 4, actual: 1 });
    }

    #[test]
    fn to_bytes_matches_received_form() {
        let raw = hex!("0a01 0300 feff 0200 6f6b");
        let command = WireCommand::from_bytes(raw.to_vec()).unwrap();
        assert_eq!(command.to_bytes().as_ref(), &raw);
    }
}
