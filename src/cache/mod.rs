//! Per-provider model cache.
//!
//! Discovery always replaces a provider's entry wholesale; entries are
//! never merged or partially updated.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::api::{ModelDescriptor, ProviderIndex};

pub mod in_flight;

pub struct ModelCache {
    entries: RwLock<HashMap<ProviderIndex, Vec<ModelDescriptor>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, provider: &ProviderIndex) -> Option<Vec<ModelDescriptor>> {
        let map = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        map.get(provider).cloned()
    }

    /// Replace the provider's entry; returns the previous list, if any.
    pub fn replace(
        &self,
        provider: ProviderIndex,
        models: Vec<ModelDescriptor>,
    ) -> Option<Vec<ModelDescriptor>> {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(provider, models)
    }

    pub fn remove(&self, provider: &ProviderIndex) -> bool {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(provider).is_some()
    }

    /// Empty the cache, returning how many providers were dropped.
    pub fn clear(&self) -> usize {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = map.len();
        map.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}
