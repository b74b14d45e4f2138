//! Fixed command header.
//!
//! Every command starts with a 4-byte header: the feature UID followed by the
//! opcode, both little-endian `u16`. The header is read in place with
//! `zerocopy`, so routing never copies the payload.

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, byteorder::little_endian::U16,
};

use crate::errors::{DecodeError, Result};

/// Identifier of a feature, unique across the protocol.
pub type FeatureUid = u16;

/// Command selector, unique within one feature.
pub type Opcode = u16;

/// Wire header preceding every argument payload.
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct CommandHeader {
    feature: U16,
    opcode: U16,
}

impl CommandHeader {
    /// Encoded header size in bytes.
    pub const SIZE: usize = 4;

    /// Build a header for the given feature and opcode.
    pub fn new(feature: FeatureUid, opcode: Opcode) -> Self {
        Self { feature: U16::new(feature), opcode: U16::new(opcode) }
    }

    /// Borrow the header at the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `HeaderTooShort` if fewer than [`Self::SIZE`] bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(header, _)| header)
            .map_err(|_| DecodeError::HeaderTooShort { expected: Self::SIZE, actual: bytes.len() })
    }

    /// Feature UID.
    pub fn feature(&self) -> FeatureUid {
        self.feature.get()
    }

    /// Opcode within the feature.
    pub fn opcode(&self) -> Opcode {
        self.opcode.get()
    }

    /// Header bytes in wire order.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

impl std::fmt::Debug for CommandHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHeader")
            .field("feature", &format_args!("0x{:04x}", self.feature()))
            .field("opcode", &self.opcode())
            .finish()
    }
}
