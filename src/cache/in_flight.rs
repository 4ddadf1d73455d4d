//! In-flight validation set — one outstanding request per (provider, model).
//!
//! A key is inserted when a validation request is issued and removed when
//! its [`FlightGuard`] drops, which happens on success, on error, and when
//! the owning future is dropped before settling.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::api::ProviderIndex;

/// Composite key: (provider, model).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FlightKey {
    provider: ProviderIndex,
    model: String,
}

impl FlightKey {
    fn new(provider: &ProviderIndex, model: &str) -> Self {
        Self {
            provider: provider.clone(),
            model: model.into(),
        }
    }
}

pub struct InFlightSet {
    keys: Mutex<HashSet<FlightKey>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(HashSet::new()),
        }
    }

    /// Claim the pair. Returns `None` when a request for it is already
    /// outstanding.
    pub fn try_acquire(&self, provider: &ProviderIndex, model: &str) -> Option<FlightGuard<'_>> {
        let key = FlightKey::new(provider, model);
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(FlightGuard { set: self, key })
    }

    pub fn contains(&self, provider: &ProviderIndex, model: &str) -> bool {
        let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.contains(&FlightKey::new(provider, model))
    }

    pub fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, key: &FlightKey) {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.remove(key);
    }
}

impl Default for InFlightSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds one (provider, model) key; releases it on drop.
pub struct FlightGuard<'a> {
    set: &'a InFlightSet,
    key: FlightKey,
}

impl FlightGuard<'_> {
    pub fn model(&self) -> &str {
        &self.key.model
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.set.release(&self.key);
    }
}
