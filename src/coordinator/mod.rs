//! Model discovery & validation coordinator.
//!
//! One instance per admin session. Owns the per-provider model cache and
//! the in-flight validation set, drives the two backend endpoints through
//! [`ModelsApi`], and reports everything user-visible through a
//! [`UiSink`]. Failures never escape an operation; they become feedback.

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::{ModelDescriptor, ModelsApi, ProviderIndex};
use crate::cache::in_flight::InFlightSet;
use crate::cache::ModelCache;
use crate::ui::{UiEvent, UiSink};

pub mod discovery;
pub mod selection;
pub mod validation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Drop a validation call's feedback when a newer call for the same
    /// provider has already written its own.
    pub discard_stale_feedback: bool,
}

pub struct Coordinator {
    api: Arc<dyn ModelsApi>,
    sink: Arc<dyn UiSink>,
    cache: ModelCache,
    in_flight: InFlightSet,
    options: CoordinatorOptions,
    /// Sequence number handed to the next validation call.
    validation_seq: AtomicU64,
    /// Newest validation sequence that wrote feedback, per provider.
    settled: Mutex<HashMap<ProviderIndex, u64>>,
    session_id: Uuid,
}

impl Coordinator {
    pub fn new(api: Arc<dyn ModelsApi>, sink: Arc<dyn UiSink>) -> Self {
        Self::with_options(api, sink, CoordinatorOptions::default())
    }

    pub fn with_options(
        api: Arc<dyn ModelsApi>,
        sink: Arc<dyn UiSink>,
        options: CoordinatorOptions,
    ) -> Self {
        let session_id = Uuid::new_v4();
        debug!(session = %session_id, ?options, "Coordinator created");
        Self {
            api,
            sink,
            cache: ModelCache::new(),
            in_flight: InFlightSet::new(),
            options,
            validation_seq: AtomicU64::new(0),
            settled: Mutex::new(HashMap::new()),
            session_id,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Switch between manual entry and the discovery dropdown.
    ///
    /// Cached models survive the switch; toggling back re-renders them.
    pub fn toggle_manual_input(&self, provider: &ProviderIndex, is_manual: bool) {
        self.sink.emit(UiEvent::ManualInputToggled {
            provider: provider.clone(),
            manual: is_manual,
        });

        if !is_manual {
            if let Some(models) = self.cache.get(provider) {
                debug!(provider = %provider, count = models.len(), "Re-rendering cached models");
                self.sink.emit(UiEvent::ModelsRendered {
                    provider: provider.clone(),
                    models,
                });
            }
        }
    }

    /// Drop one provider's cached models. The in-flight set is untouched.
    pub fn clear_cache(&self, provider: &ProviderIndex) -> bool {
        let removed = self.cache.remove(provider);
        if removed {
            info!(session = %self.session_id, provider = %provider, "Model cache cleared");
        }
        removed
    }

    /// Drop every cached model list. The in-flight set is untouched.
    pub fn clear_all_cache(&self) -> usize {
        let dropped = self.cache.clear();
        info!(session = %self.session_id, providers = dropped, "All model caches cleared");
        dropped
    }

    pub fn cached_models(&self, provider: &ProviderIndex) -> Option<Vec<ModelDescriptor>> {
        self.cache.get(provider)
    }

    pub fn is_validating(&self, provider: &ProviderIndex, model: &str) -> bool {
        self.in_flight.contains(provider, model)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedApi;
    use super::*;
    use crate::ui::testing::RecordingSink;

    fn setup() -> (Arc<ScriptedApi>, Arc<RecordingSink>, Coordinator) {
        let api = ScriptedApi::new();
        let sink = Arc::new(RecordingSink::default());
        let coordinator = Coordinator::new(api.clone(), sink.clone());
        (api, sink, coordinator)
    }

    #[tokio::test]
    async fn test_toggle_keeps_cached_models() {
        let (api, sink, coordinator) = setup();
        let p = ProviderIndex::from(0usize);
        api.set_models("0", &["gpt-4", "gpt-3.5"]);
        coordinator.refresh_models(&p).await;

        coordinator.toggle_manual_input(&p, true);
        assert_eq!(coordinator.cached_models(&p).unwrap().len(), 2);

        coordinator.toggle_manual_input(&p, false);
        let events = sink.events();
        let tail = &events[events.len() - 2..];
        assert_eq!(
            tail[0],
            UiEvent::ManualInputToggled { provider: p.clone(), manual: false }
        );
        match &tail[1] {
            UiEvent::ModelsRendered { models, .. } => assert_eq!(models.len(), 2),
            other => panic!("expected re-render, got {other:?}"),
        }
        assert_eq!(api.discover_calls(), 1, "toggling never refetches");
    }

    #[test]
    fn test_toggle_without_cache_only_switches() {
        let (_api, sink, coordinator) = setup();
        let p = ProviderIndex::from(4usize);
        coordinator.toggle_manual_input(&p, false);
        assert_eq!(
            sink.events(),
            vec![UiEvent::ManualInputToggled { provider: p, manual: false }]
        );
    }

    #[tokio::test]
    async fn test_clear_cache_single_and_all() {
        let (api, _sink, coordinator) = setup();
        api.set_models("0", &["a"]);
        api.set_models("1", &["b"]);
        coordinator.refresh_models(&"0".into()).await;
        coordinator.refresh_models(&"1".into()).await;

        assert!(coordinator.clear_cache(&"0".into()));
        assert!(!coordinator.clear_cache(&"0".into()));
        assert!(coordinator.cached_models(&"0".into()).is_none());
        assert!(coordinator.cached_models(&"1".into()).is_some());

        assert_eq!(coordinator.clear_all_cache(), 1);
        assert!(coordinator.cached_models(&"1".into()).is_none());
    }

    #[tokio::test]
    async fn test_clearing_cache_leaves_in_flight_keys() {
        let (api, _sink, coordinator) = setup();
        let p = ProviderIndex::from(0usize);
        api.valid("gpt-4");
        let gate = api.gate("gpt-4");

        let pending = coordinator.validate_models(&p, "gpt-4");
        let clearer = async {
            while !coordinator.is_validating(&p, "gpt-4") {
                tokio::task::yield_now().await;
            }
            coordinator.clear_cache(&p);
            coordinator.clear_all_cache();
            let still_in_flight = coordinator.is_validating(&p, "gpt-4");
            gate.add_permits(1);
            still_in_flight
        };

        let (feedback, still_in_flight) = tokio::join!(pending, clearer);
        assert!(still_in_flight);
        assert!(feedback.is_some());
        assert_eq!(coordinator.in_flight_count(), 0);
    }
}
