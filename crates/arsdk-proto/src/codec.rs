//! Argument codec.
//!
//! Arguments are laid out back to back with no padding. Scalars are
//! little-endian at their natural width, strings carry a `u16` byte-length
//! prefix, enums travel as `i32` and bitfields as `u32` or `u64` depending on
//! the highest wire value in their registry (see [`BitfieldWidth`]).
//!
//! Decoding is strictly sequential. Each read advances the cursor by exactly
//! the bytes it consumed, and fails with `TruncatedPayload` without consuming
//! anything when the payload is too short.

use bytes::{Buf, BufMut, BytesMut};

use crate::{
    bitfield::{Bitfield, BitfieldWidth},
    command::WireCommand,
    config::TrailingBytesPolicy,
    enums::{EnumValue, WireEnum},
    errors::{DecodeError, Result},
    header::{FeatureUid, Opcode},
};

/// Longest string payload in bytes; the length prefix is a `u16`.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// A value with a fixed wire layout that can be written to a payload.
pub trait Encode {
    /// Append the wire form of `self` to `buf`.
    fn encode(&self, buf: &mut BytesMut);
}

/// A value with a fixed wire layout that can be read from a payload.
pub trait Decode: Sized {
    /// Read one value, advancing the decoder past it.
    fn decode(decoder: &mut WireDecoder<'_>) -> Result<Self>;
}

macro_rules! scalar_codec {
    ($($ty:ty => $put:ident, $get:ident;)+) => {
        $(
            impl Encode for $ty {
                fn encode(&self, buf: &mut BytesMut) {
                    buf.$put(*self);
                }
            }

            impl Decode for $ty {
                fn decode(decoder: &mut WireDecoder<'_>) -> Result<Self> {
                    decoder.ensure(std::mem::size_of::<$ty>(), stringify!($ty))?;
                    Ok(decoder.rest.$get())
                }
            }
        )+
    };
}

scalar_codec! {
    i8 => put_i8, get_i8;
    u8 => put_u8, get_u8;
    i16 => put_i16_le, get_i16_le;
    u16 => put_u16_le, get_u16_le;
    i32 => put_i32_le, get_i32_le;
    u32 => put_u32_le, get_u32_le;
    i64 => put_i64_le, get_i64_le;
    u64 => put_u64_le, get_u64_le;
    f32 => put_f32_le, get_f32_le;
}

impl Encode for str {
    /// Strings longer than [`MAX_STRING_LEN`] bytes are cut at the last
    /// character boundary that fits.
    fn encode(&self, buf: &mut BytesMut) {
        let mut end = self.len().min(MAX_STRING_LEN);
        while !self.is_char_boundary(end) {
            end -= 1;
        }
        buf.put_u16_le(end as u16);
        buf.put_slice(&self.as_bytes()[..end]);
    }
}

impl Encode for String {
    fn encode(&self, buf: &mut BytesMut) {
        self.as_str().encode(buf);
    }
}

impl Decode for String {
    fn decode(decoder: &mut WireDecoder<'_>) -> Result<Self> {
        let Some(prefix) = decoder.rest.get(..2) else {
            return Err(DecodeError::TruncatedPayload {
                wire_type: "string length",
                needed: 2,
                remaining: decoder.rest.len(),
            });
        };
        let len = usize::from(u16::from_le_bytes([prefix[0], prefix[1]]));
        let bytes = &decoder.take(2 + len, "string")?[2..];
        std::str::from_utf8(bytes).map(str::to_owned).map_err(|_| DecodeError::InvalidUtf8 { len })
    }
}

/// Builds the payload of one outgoing command.
///
/// ```
/// use arsdk_proto::WireEncoder;
///
/// let mut encoder = WireEncoder::new(0x0a01, 3);
/// encoder.put(&-2i16).put("ok");
/// let command = encoder.finish();
/// assert_eq!(command.payload(), &[0xfe, 0xff, 0x02, 0x00, b'o', b'k']);
/// ```
#[derive(Debug)]
pub struct WireEncoder {
    feature: FeatureUid,
    opcode: Opcode,
    payload: BytesMut,
}

impl WireEncoder {
    /// Start a command for the given feature and opcode.
    pub fn new(feature: FeatureUid, opcode: Opcode) -> Self {
        Self { feature, opcode, payload: BytesMut::new() }
    }

    /// Append a scalar or string argument.
    ///
    /// Strings longer than [`MAX_STRING_LEN`] bytes are truncated at the last
    /// character boundary that fits, so the receiver sees a prefix.
    pub fn put<T: Encode + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.encode(&mut self.payload);
        self
    }

    /// Append an enum argument as its `i32` wire value.
    pub fn put_enum<E: WireEnum>(&mut self, variant: E) -> &mut Self {
        self.payload.put_i32_le(variant.to_wire());
        self
    }

    /// Append a bitfield argument at the width its registry requires.
    pub fn put_bitfield<E: WireEnum>(&mut self, bitfield: Bitfield<E>) -> &mut Self {
        match BitfieldWidth::of::<E>() {
            BitfieldWidth::U32 => self.payload.put_u32_le(bitfield.to_wire() as u32),
            BitfieldWidth::U64 => self.payload.put_u64_le(bitfield.to_wire()),
        }
        self
    }

    /// Seal the payload into a command.
    pub fn finish(self) -> WireCommand {
        WireCommand::new(self.feature, self.opcode, self.payload.freeze())
    }
}

/// Sequential reader over one command payload.
#[derive(Debug, Clone)]
pub struct WireDecoder<'a> {
    rest: &'a [u8],
    consumed: usize,
}

impl<'a> WireDecoder<'a> {
    /// Start reading at the beginning of `payload`.
    pub fn new(payload: &'a [u8]) -> Self {
        Self { rest: payload, consumed: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Read a scalar or string argument.
    pub fn read<T: Decode>(&mut self) -> Result<T> {
        T::decode(self)
    }

    /// Read an enum argument. Values missing from the registry decode to
    /// [`EnumValue::Unknown`].
    pub fn read_enum<E: WireEnum>(&mut self) -> Result<EnumValue<E>> {
        self.ensure(4, E::NAME)?;
        Ok(E::from_wire(self.rest.get_i32_le()))
    }

    /// Read a bitfield argument at the width its registry requires.
    pub fn read_bitfield<E: WireEnum>(&mut self) -> Result<Bitfield<E>> {
        let width = BitfieldWidth::of::<E>();
        self.ensure(width.size(), E::NAME)?;
        let bits = match width {
            BitfieldWidth::U32 => u64::from(self.rest.get_u32_le()),
            BitfieldWidth::U64 => self.rest.get_u64_le(),
        };
        Ok(Bitfield::from_wire(bits))
    }

    /// Finish decoding and apply the trailing-bytes policy.
    ///
    /// Returns the number of ignored trailing bytes.
    ///
    /// # Errors
    ///
    /// Returns `TrailingBytes` if bytes remain and the policy rejects them.
    pub fn finish(self, policy: TrailingBytesPolicy) -> Result<usize> {
        match (self.rest.len(), policy) {
            (0, _) => Ok(0),
            (count, TrailingBytesPolicy::Ignore) => Ok(count),
            (count, TrailingBytesPolicy::Reject) => Err(DecodeError::TrailingBytes { count }),
        }
    }

    /// Check that `needed` bytes remain and count them as consumed.
    fn ensure(&mut self, needed: usize, wire_type: &'static str) -> Result<()> {
        if self.rest.len() < needed {
            return Err(DecodeError::TruncatedPayload {
                wire_type,
                needed,
                remaining: self.rest.len(),
            });
        }
        self.consumed += needed;
        Ok(())
    }

    /// Consume `len` bytes as one field.
    fn take(&mut self, len: usize, wire_type: &'static str) -> Result<&'a [u8]> {
        self.ensure(len, wire_type)?;
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head)
    }
}
