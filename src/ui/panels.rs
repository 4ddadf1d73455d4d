//! In-memory provider panels — the form state behind each provider row.
//!
//! Each registered provider owns a dropdown, a loading indicator, a
//! refresh button, a feedback line, the free-text model list and the
//! manual-input toggle. Events and UI callbacks for providers without a
//! registered panel are ignored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use super::{Feedback, UiEvent, UiSink};
use crate::api::{ModelDescriptor, ProviderIndex};
use crate::coordinator::Coordinator;

/// One dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelOption {
    pub value: String,
    pub label: String,
}

impl From<&ModelDescriptor> for ModelOption {
    fn from(model: &ModelDescriptor) -> Self {
        Self {
            value: model.id.clone(),
            label: model.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelState {
    pub loading: bool,
    pub refresh_enabled: bool,
    pub options: Vec<ModelOption>,
    pub feedback: Option<FeedbackRecord>,
    pub model_list: String,
    pub manual_input: bool,
}

impl PanelState {
    fn new(model_list: &str) -> Self {
        Self {
            loading: false,
            refresh_enabled: true,
            options: Vec::new(),
            feedback: None,
            model_list: model_list.to_string(),
            manual_input: false,
        }
    }
}

pub struct ProviderPanels {
    panels: RwLock<HashMap<ProviderIndex, PanelState>>,
}

impl ProviderPanels {
    pub fn new() -> Self {
        Self {
            panels: RwLock::new(HashMap::new()),
        }
    }

    /// Register a provider row with its initial model list text.
    pub fn register(&self, provider: ProviderIndex, model_list: &str) {
        let mut panels = self.panels.write().unwrap_or_else(PoisonError::into_inner);
        panels.insert(provider, PanelState::new(model_list));
    }

    pub fn unregister(&self, provider: &ProviderIndex) -> bool {
        let mut panels = self.panels.write().unwrap_or_else(PoisonError::into_inner);
        panels.remove(provider).is_some()
    }

    pub fn state(&self, provider: &ProviderIndex) -> Option<PanelState> {
        let panels = self.panels.read().unwrap_or_else(PoisonError::into_inner);
        panels.get(provider).cloned()
    }

    fn contains(&self, provider: &ProviderIndex) -> bool {
        let panels = self.panels.read().unwrap_or_else(PoisonError::into_inner);
        panels.contains_key(provider)
    }

    fn with_panel(&self, provider: &ProviderIndex, f: impl FnOnce(&mut PanelState)) -> bool {
        let mut panels = self.panels.write().unwrap_or_else(PoisonError::into_inner);
        match panels.get_mut(provider) {
            Some(panel) => {
                f(panel);
                true
            }
            None => false,
        }
    }

    // ── Event wiring ────────────────────────────────────────────────

    /// Refresh button.
    pub async fn on_refresh_clicked(
        &self,
        coordinator: &Coordinator,
        provider: &ProviderIndex,
    ) -> Option<usize> {
        if !self.contains(provider) {
            debug!(provider = %provider, "Refresh for unknown panel ignored");
            return None;
        }
        coordinator.refresh_models(provider).await
    }

    /// Dropdown change.
    pub async fn on_model_selected(
        &self,
        coordinator: &Coordinator,
        provider: &ProviderIndex,
        selected: &str,
    ) -> Option<String> {
        let current = self.state(provider)?.model_list;
        coordinator
            .handle_model_selection(provider, &current, selected)
            .await
    }

    /// Text edit in the free-text model list.
    pub async fn on_model_list_edited(
        &self,
        coordinator: &Coordinator,
        provider: &ProviderIndex,
        text: &str,
    ) -> Option<Feedback> {
        if !self.with_panel(provider, |panel| panel.model_list = text.to_string()) {
            return None;
        }
        coordinator.validate_models(provider, text).await
    }

    /// Manual-input checkbox.
    pub fn on_manual_toggled(
        &self,
        coordinator: &Coordinator,
        provider: &ProviderIndex,
        manual: bool,
    ) -> bool {
        if !self.contains(provider) {
            return false;
        }
        coordinator.toggle_manual_input(provider, manual);
        true
    }
}

impl Default for ProviderPanels {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSink for ProviderPanels {
    fn emit(&self, event: UiEvent) {
        let provider = event.provider().clone();
        let applied = self.with_panel(&provider, |panel| match event {
            UiEvent::Loading { active, .. } => {
                panel.loading = active;
                panel.refresh_enabled = !active;
            }
            UiEvent::ModelsRendered { models, .. } => {
                panel.options = models.iter().map(ModelOption::from).collect();
            }
            UiEvent::Feedback { feedback, .. } => {
                panel.feedback = Some(FeedbackRecord {
                    feedback,
                    updated_at: Utc::now(),
                });
            }
            UiEvent::ModelListChanged { text, .. } => panel.model_list = text,
            UiEvent::ManualInputToggled { manual, .. } => panel.manual_input = manual,
        });

        if !applied {
            debug!(provider = %provider, "No panel registered — event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::http::HttpModelsApi;
    use crate::ui::Severity;

    async fn mount_json(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(status).set_body_raw(body.to_string(), "application/json"),
            )
            .mount(server)
            .await;
    }

    async fn backend() -> MockServer {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/api/models/discover/0",
            200,
            serde_json::json!({
                "models": [
                    {"id": "gpt-4", "owned_by": "openai", "object": "model"},
                    {"id": "gpt-3.5-turbo", "owned_by": "openai", "object": "model"}
                ],
                "count": 2
            }),
        )
        .await;
        mount_json(
            &server,
            "/api/models/discover/1",
            200,
            serde_json::json!({"error": "provider unreachable"}),
        )
        .await;
        for model in ["gpt-4", "gpt-3.5-turbo"] {
            mount_json(
                &server,
                &format!("/api/models/validate/0/{model}"),
                200,
                serde_json::json!({"valid": true}),
            )
            .await;
        }
        mount_json(
            &server,
            "/api/models/validate/0/bogus",
            200,
            serde_json::json!({"valid": false, "error": "unknown model"}),
        )
        .await;
        mount_json(
            &server,
            "/api/models/validate/0/broken",
            500,
            serde_json::json!({"error": "upstream timeout"}),
        )
        .await;
        server
    }

    fn wire(server: &MockServer) -> (Arc<ProviderPanels>, Coordinator) {
        let panels = Arc::new(ProviderPanels::new());
        let api = Arc::new(HttpModelsApi::new(&server.uri()).unwrap());
        let coordinator = Coordinator::new(api, panels.clone());
        (panels, coordinator)
    }

    #[tokio::test]
    async fn test_refresh_select_and_edit_flow() {
        let server = backend().await;
        let (panels, coordinator) = wire(&server);
        let p = ProviderIndex::from(0usize);
        panels.register(p.clone(), "gpt-4");

        assert_eq!(panels.on_refresh_clicked(&coordinator, &p).await, Some(2));
        let state = panels.state(&p).unwrap();
        assert!(!state.loading);
        assert!(state.refresh_enabled);
        assert_eq!(
            state.options,
            vec![
                ModelOption { value: "gpt-4".into(), label: "gpt-4 (openai)".into() },
                ModelOption { value: "gpt-3.5-turbo".into(), label: "gpt-3.5-turbo (openai)".into() },
            ]
        );
        assert_eq!(state.feedback.unwrap().feedback, Feedback::success("Found 2 models"));

        let text = panels
            .on_model_selected(&coordinator, &p, "gpt-3.5-turbo")
            .await
            .unwrap();
        assert_eq!(text, "gpt-4, gpt-3.5-turbo");
        let state = panels.state(&p).unwrap();
        assert_eq!(state.model_list, text);
        assert_eq!(state.feedback.unwrap().feedback, Feedback::success("All 2 models valid"));

        let feedback = panels
            .on_model_list_edited(&coordinator, &p, "gpt-4, bogus, broken")
            .await
            .unwrap();
        assert_eq!(feedback.severity, Severity::Warning);
        assert_eq!(
            feedback.message,
            "1 valid, 2 invalid: bogus (unknown model), broken (HTTP 500: upstream timeout)"
        );
        assert_eq!(panels.state(&p).unwrap().model_list, "gpt-4, bogus, broken");
        assert_eq!(coordinator.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_discovery_error_restores_refresh() {
        let server = backend().await;
        let (panels, coordinator) = wire(&server);
        let p = ProviderIndex::from(1usize);
        panels.register(p.clone(), "");

        assert_eq!(panels.on_refresh_clicked(&coordinator, &p).await, None);
        let state = panels.state(&p).unwrap();
        assert!(!state.loading);
        assert!(state.refresh_enabled);
        assert!(state.options.is_empty());
        let feedback = state.feedback.unwrap().feedback;
        assert_eq!(feedback.severity, Severity::Error);
        assert!(feedback.message.contains("provider unreachable"));
    }

    #[tokio::test]
    async fn test_missing_panel_is_a_no_op() {
        let server = backend().await;
        let (panels, coordinator) = wire(&server);
        let p = ProviderIndex::from(9usize);

        assert_eq!(panels.on_refresh_clicked(&coordinator, &p).await, None);
        assert!(panels.on_model_selected(&coordinator, &p, "gpt-4").await.is_none());
        assert!(panels.on_model_list_edited(&coordinator, &p, "gpt-4").await.is_none());
        assert!(!panels.on_manual_toggled(&coordinator, &p, true));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.is_empty());
        assert!(panels.state(&p).is_none());
    }

    #[tokio::test]
    async fn test_manual_toggle_round_trip_keeps_options() {
        let server = backend().await;
        let (panels, coordinator) = wire(&server);
        let p = ProviderIndex::from(0usize);
        panels.register(p.clone(), "");
        panels.on_refresh_clicked(&coordinator, &p).await;

        assert!(panels.on_manual_toggled(&coordinator, &p, true));
        assert!(panels.state(&p).unwrap().manual_input);

        assert!(panels.on_manual_toggled(&coordinator, &p, false));
        let state = panels.state(&p).unwrap();
        assert!(!state.manual_input);
        assert_eq!(state.options.len(), 2);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[test]
    fn test_events_for_unregistered_provider_are_dropped() {
        let panels = ProviderPanels::new();
        panels.register("0".into(), "");
        panels.emit(UiEvent::ModelListChanged {
            provider: "1".into(),
            text: "gpt-4".into(),
        });
        assert!(panels.state(&"1".into()).is_none());
        assert_eq!(panels.state(&"0".into()).unwrap().model_list, "");

        assert!(panels.unregister(&"0".into()));
        assert!(!panels.unregister(&"0".into()));
    }
}
