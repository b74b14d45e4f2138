//! Inbound command routing.

use std::sync::{Arc, RwLock};

use arsdk_proto::{
    DecodeError, DispatchTable, DispatchTableBuilder, Dispatched, Feature, FeatureUid,
    Registrations,
};
use tracing::{debug, warn};

use crate::{ControllerError, Result, RouterConfig};

/// Routes inbound command buffers to registered callbacks.
///
/// Any number of threads may call [`Self::receive`] concurrently. Callback
/// registration takes a write lock and waits for in-flight commands.
/// Callbacks run while the read lock is held, so they must not register or
/// unregister callbacks on the same router.
#[derive(Debug)]
pub struct CommandRouter {
    table: Arc<DispatchTable>,
    registrations: RwLock<Registrations>,
    config: RouterConfig,
}

impl CommandRouter {
    /// Build the dispatch table from `features` with the decode options in
    /// `config`.
    pub fn new(features: DispatchTableBuilder, config: RouterConfig) -> Result<Self> {
        let table = features.config(config.decode).build()?;
        Ok(Self::with_table(Arc::new(table), config))
    }

    /// Route through an existing table.
    ///
    /// The table keeps its own decode options; only the reporting options of
    /// `config` apply.
    pub fn with_table(table: Arc<DispatchTable>, config: RouterConfig) -> Self {
        let config = RouterConfig { decode: table.config(), ..config };
        Self { table, registrations: RwLock::new(Registrations::new()), config }
    }

    /// Shared dispatch table.
    pub fn table(&self) -> &Arc<DispatchTable> {
        &self.table
    }

    /// Active configuration.
    pub fn config(&self) -> RouterConfig {
        self.config
    }

    /// Register the callback set for feature `F`, replacing any previous one.
    ///
    /// Returns `true` if a previous set was replaced.
    pub fn register<F: Feature>(&self, callbacks: Arc<F::Callbacks>) -> Result<bool> {
        if !self.table.contains(F::UID) {
            warn!(feature = F::NAME, "callbacks registered for a feature the table does not route");
        }
        let mut registrations =
            self.registrations.write().map_err(|_| ControllerError::RegistryPoisoned)?;
        let replaced = registrations.register::<F>(callbacks);
        debug!(feature = F::NAME, replaced, "callbacks registered");
        Ok(replaced)
    }

    /// Remove the callback set for feature `F`.
    ///
    /// Commands for `F` are still decoded afterwards, then discarded.
    pub fn unregister<F: Feature>(&self) -> Result<bool> {
        let mut registrations =
            self.registrations.write().map_err(|_| ControllerError::RegistryPoisoned)?;
        let removed = registrations.unregister::<F>();
        debug!(feature = F::NAME, removed, "callbacks unregistered");
        Ok(removed)
    }

    /// Whether a callback set is registered under `feature`.
    pub fn is_registered(&self, feature: FeatureUid) -> Result<bool> {
        let registrations =
            self.registrations.read().map_err(|_| ControllerError::RegistryPoisoned)?;
        Ok(registrations.is_registered(feature))
    }

    /// Decode one command buffer (header and payload) and deliver it.
    ///
    /// Returns `Ok(None)` for a command this build does not know when
    /// version-skew errors are not surfaced. Trailing bytes rejected by a
    /// strict decode configuration are always returned as errors.
    ///
    /// # Errors
    ///
    /// `RegistryPoisoned` if the callback registry lock is poisoned, and
    /// `Decode` for malformed commands and, when configured, version skew.
    pub fn receive(&self, bytes: &[u8]) -> Result<Option<Dispatched>> {
        let registrations =
            self.registrations.read().map_err(|_| ControllerError::RegistryPoisoned)?;

        match self.table.dispatch_bytes(bytes, &registrations) {
            Ok(outcome) => {
                if outcome.handled {
                    debug!(
                        feature = outcome.feature,
                        command = outcome.command,
                        trailing_bytes = outcome.trailing_bytes,
                        "command delivered"
                    );
                } else {
                    debug!(
                        feature = outcome.feature,
                        command = outcome.command,
                        "no callbacks registered, command discarded"
                    );
                }
                Ok(Some(outcome))
            },
            Err(err) if err.is_version_skew() => {
                debug!(error = %err, len = bytes.len(), "command from a newer protocol revision");
                let rejected_by_policy = matches!(err, DecodeError::TrailingBytes { .. });
                if self.config.surface_version_skew || rejected_by_policy {
                    Err(err.into())
                } else {
                    Ok(None)
                }
            },
            Err(err) => {
                warn!(error = %err, len = bytes.len(), "malformed command dropped");
                Err(err.into())
            },
        }
    }
}
