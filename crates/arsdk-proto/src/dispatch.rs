//! Feature dispatch table.
//!
//! A [`Feature`] declares its UID, a static table of command descriptors and
//! how decoded messages reach its callback set. A [`DispatchTable`] collects
//! features once at startup into an immutable `(UID, opcode)` index, so
//! concurrent dispatch needs no locking.
//!
//! # Routing
//!
//! 1. The header's feature UID selects the feature, or fails with
//!    `UnknownFeature`.
//! 2. The opcode selects the descriptor, or fails with `UnknownCommand`.
//! 3. The descriptor decodes every declared field. Trailing bytes are checked
//!    against the [`DecodeConfig`].
//! 4. Only after the whole payload decoded is the message delivered to the
//!    feature's registered callback set, if any.

use std::{collections::HashMap, fmt, marker::PhantomData};

use crate::{
    codec::WireDecoder,
    command::WireCommand,
    config::{DecodeConfig, TrailingBytesPolicy},
    errors::{DecodeError, Result, TableError},
    header::{CommandHeader, FeatureUid, Opcode},
    registrations::Registrations,
};

/// Which peer sends a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Device to controller
    Event,
    /// Controller to device
    Command,
}

/// Static description of one command of a feature.
#[derive(Debug)]
pub struct CommandDescriptor<M: 'static> {
    /// Opcode within the feature
    pub opcode: Opcode,
    /// Command name as declared by the feature
    pub name: &'static str,
    /// Sending peer
    pub direction: Direction,
    /// Reads every declared field in declaration order
    pub decode: fn(&mut WireDecoder<'_>) -> Result<M>,
}

/// A group of commands sharing one UID.
///
/// Implementations are declarations: constants, a static descriptor table and
/// a delivery function mapping each decoded message to a callback method.
pub trait Feature: 'static {
    /// Feature UID
    const UID: FeatureUid;

    /// Feature name
    const NAME: &'static str;

    /// Decoded form of any command of this feature.
    type Message: fmt::Debug + 'static;

    /// Callback set registered by the application.
    type Callbacks: ?Sized + Send + Sync + 'static;

    /// Every command and event of the feature.
    const COMMANDS: &'static [CommandDescriptor<Self::Message>];

    /// Hand a decoded message to the matching callback.
    fn deliver(message: Self::Message, callbacks: &Self::Callbacks);
}

/// Decode a command of feature `F` without delivering it.
///
/// # Errors
///
/// `UnknownFeature` if the command belongs to another feature,
/// `UnknownCommand` if `F` does not declare the opcode, and any payload
/// decoding error.
pub fn decode<F: Feature>(command: &WireCommand, config: DecodeConfig) -> Result<F::Message> {
    if command.feature() != F::UID {
        return Err(DecodeError::UnknownFeature { feature: command.feature() });
    }
    let descriptor = F::COMMANDS
        .iter()
        .find(|descriptor| descriptor.opcode == command.opcode())
        .ok_or(DecodeError::UnknownCommand { feature: F::UID, opcode: command.opcode() })?;

    let mut decoder = WireDecoder::new(command.payload());
    let message = (descriptor.decode)(&mut decoder)?;
    decoder.finish(config.trailing_bytes)?;
    Ok(message)
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// Feature name
    pub feature: &'static str,
    /// Command name
    pub command: &'static str,
    /// Whether a callback set was registered for the feature
    pub handled: bool,
    /// Bytes left after the last declared field and ignored
    pub trailing_bytes: usize,
}

/// Listing entry returned by [`DispatchTable::describe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    /// Feature UID
    pub feature: FeatureUid,
    /// Feature name
    pub feature_name: &'static str,
    /// Opcode within the feature
    pub opcode: Opcode,
    /// Command name
    pub name: &'static str,
    /// Sending peer
    pub direction: Direction,
}

/// Type-erased view of one feature.
trait Route: Send + Sync {
    fn uid(&self) -> FeatureUid;

    fn name(&self) -> &'static str;

    fn opcodes(&self) -> Vec<Opcode>;

    fn describe(&self) -> Vec<CommandInfo>;

    fn dispatch(
        &self,
        index: usize,
        payload: &[u8],
        policy: TrailingBytesPolicy,
        registrations: &Registrations,
    ) -> Result<Dispatched>;
}

struct FeatureRoute<F>(PhantomData<fn() -> F>);

impl<F: Feature> Route for FeatureRoute<F> {
    fn uid(&self) -> FeatureUid {
        F::UID
    }

    fn name(&self) -> &'static str {
        F::NAME
    }

    fn opcodes(&self) -> Vec<Opcode> {
        F::COMMANDS.iter().map(|descriptor| descriptor.opcode).collect()
    }

    fn describe(&self) -> Vec<CommandInfo> {
        F::COMMANDS
            .iter()
            .map(|descriptor| CommandInfo {
                feature: F::UID,
                feature_name: F::NAME,
                opcode: descriptor.opcode,
                name: descriptor.name,
                direction: descriptor.direction,
            })
            .collect()
    }

    fn dispatch(
        &self,
        index: usize,
        payload: &[u8],
        policy: TrailingBytesPolicy,
        registrations: &Registrations,
    ) -> Result<Dispatched> {
        let descriptor = &F::COMMANDS[index];

        let mut decoder = WireDecoder::new(payload);
        let message = (descriptor.decode)(&mut decoder)?;
        let trailing_bytes = decoder.finish(policy)?;

        let callbacks = registrations.get::<F>();
        if let Some(callbacks) = callbacks {
            F::deliver(message, callbacks);
        }

        Ok(Dispatched {
            feature: F::NAME,
            command: descriptor.name,
            handled: callbacks.is_some(),
            trailing_bytes,
        })
    }
}

/// Immutable routing index from `(UID, opcode)` to decoders.
pub struct DispatchTable {
    config: DecodeConfig,
    features: Vec<Box<dyn Route>>,
    by_uid: HashMap<FeatureUid, usize>,
    routes: HashMap<(FeatureUid, Opcode), (usize, usize)>,
}

impl DispatchTable {
    /// Start building a table.
    pub fn builder() -> DispatchTableBuilder {
        DispatchTableBuilder::default()
    }

    /// Decode configuration applied to every command.
    pub fn config(&self) -> DecodeConfig {
        self.config
    }

    /// Whether a feature with this UID is known.
    pub fn contains(&self, feature: FeatureUid) -> bool {
        self.by_uid.contains_key(&feature)
    }

    /// Every known command, ordered by feature UID then opcode.
    pub fn describe(&self) -> Vec<CommandInfo> {
        let mut all: Vec<CommandInfo> =
            self.features.iter().flat_map(|feature| feature.describe()).collect();
        all.sort_by_key(|info| (info.feature, info.opcode));
        all
    }

    /// Route a parsed command to its decoder and callback.
    ///
    /// # Errors
    ///
    /// `UnknownFeature` and `UnknownCommand` for commands this build does not
    /// know, and any payload decoding error. No callback is invoked on error.
    pub fn dispatch(
        &self,
        command: &WireCommand,
        registrations: &Registrations,
    ) -> Result<Dispatched> {
        self.route(command.header(), command.payload(), registrations)
    }

    /// Route a raw command buffer (header and payload) without copying it.
    ///
    /// # Errors
    ///
    /// `HeaderTooShort` if the buffer cannot hold a header, otherwise as
    /// [`Self::dispatch`].
    pub fn dispatch_bytes(
        &self,
        bytes: &[u8],
        registrations: &Registrations,
    ) -> Result<Dispatched> {
        let header = CommandHeader::from_bytes(bytes)?;
        self.route(header, &bytes[CommandHeader::SIZE..], registrations)
    }

    fn route(
        &self,
        header: &CommandHeader,
        payload: &[u8],
        registrations: &Registrations,
    ) -> Result<Dispatched> {
        let (feature, opcode) = (header.feature(), header.opcode());
        let Some(&(slot, index)) = self.routes.get(&(feature, opcode)) else {
            return Err(if self.contains(feature) {
                DecodeError::UnknownCommand { feature, opcode }
            } else {
                DecodeError::UnknownFeature { feature }
            });
        };
        self.features[slot].dispatch(index, payload, self.config.trailing_bytes, registrations)
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("config", &self.config)
            .field("features", &self.features.iter().map(|route| route.name()).collect::<Vec<_>>())
            .field("routes", &self.routes.len())
            .finish()
    }
}

/// Collects features for a [`DispatchTable`].
#[derive(Default)]
pub struct DispatchTableBuilder {
    config: DecodeConfig,
    features: Vec<Box<dyn Route>>,
}

impl DispatchTableBuilder {
    /// Add feature `F`.
    #[must_use]
    pub fn feature<F: Feature>(mut self) -> Self {
        self.features.push(Box::new(FeatureRoute::<F>(PhantomData)));
        self
    }

    /// Decode configuration for the table.
    #[must_use]
    pub fn config(mut self, config: DecodeConfig) -> Self {
        self.config = config;
        self
    }

    /// Index every feature's commands.
    ///
    /// # Errors
    ///
    /// Fails if two features share a UID or a feature repeats an opcode.
    pub fn build(self) -> std::result::Result<DispatchTable, TableError> {
        let mut by_uid: HashMap<FeatureUid, usize> = HashMap::new();
        let mut routes: HashMap<(FeatureUid, Opcode), (usize, usize)> = HashMap::new();

        for (slot, feature) in self.features.iter().enumerate() {
            if let Some(&existing) = by_uid.get(&feature.uid()) {
                return Err(TableError::DuplicateFeature {
                    uid: feature.uid(),
                    existing: self.features[existing].name(),
                    duplicate: feature.name(),
                });
            }
            by_uid.insert(feature.uid(), slot);

            for (index, opcode) in feature.opcodes().into_iter().enumerate() {
                if routes.insert((feature.uid(), opcode), (slot, index)).is_some() {
                    return Err(TableError::DuplicateOpcode { feature: feature.name(), opcode });
                }
            }
        }

        Ok(DispatchTable { config: self.config, features: self.features, by_uid, routes })
    }
}

impl fmt::Debug for DispatchTableBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTableBuilder")
            .field("config", &self.config)
            .field("features", &self.features.iter().map(|route| route.name()).collect::<Vec<_>>())
            .finish()
    }
}
