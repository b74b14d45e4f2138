//! Callback sets registered per feature.

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use crate::{dispatch::Feature, header::FeatureUid};

/// Map from feature UID to the callback set receiving its messages.
///
/// Dispatch only reads this map. Mutating it while commands are in flight is
/// up to the owner, typically behind a reader-writer lock.
#[derive(Default)]
pub struct Registrations {
    callbacks: HashMap<FeatureUid, Box<dyn Any + Send + Sync>>,
}

impl Registrations {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the callback set for feature `F`.
    ///
    /// Returns `true` if it replaced a previous registration.
    pub fn register<F: Feature>(&mut self, callbacks: Arc<F::Callbacks>) -> bool {
        self.callbacks.insert(F::UID, Box::new(callbacks)).is_some()
    }

    /// Remove the callback set for feature `F`.
    ///
    /// Returns `true` if one was registered.
    pub fn unregister<F: Feature>(&mut self) -> bool {
        self.callbacks.remove(&F::UID).is_some()
    }

    /// Whether any callback set is registered under this UID.
    pub fn is_registered(&self, feature: FeatureUid) -> bool {
        self.callbacks.contains_key(&feature)
    }

    /// Callback set for feature `F`, if registered.
    pub fn get<F: Feature>(&self) -> Option<&F::Callbacks> {
        self.callbacks
            .get(&F::UID)?
            .downcast_ref::<Arc<F::Callbacks>>()
            .map(|callbacks| &**callbacks)
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for Registrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut uids: Vec<_> = self.callbacks.keys().copied().collect();
        uids.sort_unstable();
        f.debug_struct("Registrations").field("features", &uids).finish()
    }
}
