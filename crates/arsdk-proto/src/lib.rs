//! Feature-command engine for the ARSDK wire protocol.
//!
//! A command is a 4-byte header (feature UID, opcode) followed by a payload of
//! fixed-layout arguments. Features group related commands under one UID and
//! declare, for each opcode, how its arguments are decoded. This crate
//! provides the pieces every feature binding is built from:
//!
//! - [`WireCommand`]: the immutable command buffer handed to and received from
//!   the transport
//! - [`WireEncoder`] / [`WireDecoder`]: the argument codec
//! - [`WireEnum`] / [`EnumValue`]: enum registries that decode unmapped values
//!   to `Unknown` instead of failing
//! - [`Bitfield`]: sets of enum variants as bitmasks
//! - [`DispatchTable`]: routes inbound commands to the registered callbacks
//!
//! # Forward compatibility
//!
//! Devices may run firmware newer than the controller. Unknown features and
//! opcodes are reported as recoverable errors, unknown enum values decode to
//! [`EnumValue::Unknown`], unknown bitfield bits are skipped, and fields
//! appended to a known command are ignored unless the [`DecodeConfig`] asks
//! otherwise.
//!
//! The engine is pure: no I/O, no logging, no shared mutable state. Tables are
//! built once and can be shared across threads.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bitfield;
pub mod codec;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod enums;
pub mod errors;
pub mod header;
pub mod registrations;

pub use bitfield::{Bitfield, BitfieldWidth};
pub use codec::{Decode, Encode, WireDecoder, WireEncoder};
pub use command::WireCommand;
pub use config::{DecodeConfig, TrailingBytesPolicy};
pub use dispatch::{
    CommandDescriptor, CommandInfo, Direction, DispatchTable, DispatchTableBuilder, Dispatched,
    Feature,
};
pub use enums::{EnumValue, WireEnum};
pub use errors::{DecodeError, Result, TableError};
pub use header::{CommandHeader, FeatureUid, Opcode};
pub use registrations::Registrations;
