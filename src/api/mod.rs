//! Discovery/validation API — provider-agnostic interface.
//!
//! The coordinator only ever talks to the backend through [`ModelsApi`].
//! The HTTP implementation lives in [`http`]; tests inject scripted fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use crate::error::ApiError;

pub mod http;

// ── Core Types ──────────────────────────────────────────────────────

/// Opaque identifier of one configured provider.
///
/// Supplied by the UI (usually the provider's position in the admin
/// form); the coordinator never generates one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderIndex(String);

impl ProviderIndex {
    pub fn new(index: impl Into<String>) -> Self {
        Self(index.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderIndex {
    fn from(index: &str) -> Self {
        Self::new(index)
    }
}

impl From<String> for ProviderIndex {
    fn from(index: String) -> Self {
        Self(index)
    }
}

impl From<usize> for ProviderIndex {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

/// A model discovered from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), owned_by: None, object: None }
    }

    /// Dropdown label: `id (owner)` when the owner is known.
    pub fn label(&self) -> String {
        match &self.owned_by {
            Some(owner) if !owner.is_empty() => format!("{} ({})", self.id, owner),
            _ => self.id.clone(),
        }
    }
}

/// Body of `GET /api/models/discover/{provider}`.
///
/// Either `{ models, count }` or `{ error }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryPayload {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiscoveryPayload {
    /// Classify the payload. An `error` field fails the discovery even
    /// though the transport succeeded.
    ///
    /// The returned list has non-empty, unique ids (first occurrence wins).
    pub fn into_models(self) -> Result<Vec<ModelDescriptor>, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::Application(error));
        }

        let received = self.models.len();
        let mut seen = HashSet::with_capacity(received);
        let models: Vec<ModelDescriptor> = self
            .models
            .into_iter()
            .filter(|m| !m.id.is_empty() && seen.insert(m.id.clone()))
            .collect();

        if models.len() != received {
            warn!(
                received,
                kept = models.len(),
                "Dropped empty or duplicate model ids from discovery payload"
            );
        }

        Ok(models)
    }
}

/// Body of `GET /api/models/validate/{provider}/{model}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationPayload {
    #[serde(default)]
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of validating one model token. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub model: String,
    pub valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn from_payload(model: &str, payload: ValidationPayload) -> Self {
        Self { model: model.to_string(), valid: payload.valid, error: payload.error }
    }

    pub fn failed(model: &str, error: &ApiError) -> Self {
        Self { model: model.to_string(), valid: false, error: Some(error.to_string()) }
    }
}

// ── API Trait ───────────────────────────────────────────────────────

/// The two backend endpoints the coordinator consumes.
#[async_trait]
pub trait ModelsApi: Send + Sync {
    /// Fetch the provider's model list.
    async fn discover(&self, provider: &ProviderIndex) -> Result<DiscoveryPayload, ApiError>;

    /// Ask the provider whether `model` is acceptable.
    async fn validate(
        &self,
        provider: &ProviderIndex,
        model: &str,
    ) -> Result<ValidationPayload, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_index_conversions() {
        assert_eq!(ProviderIndex::from(3usize).as_str(), "3");
        assert_eq!(ProviderIndex::from("openai"), ProviderIndex::new("openai".to_string()));
        assert_eq!(ProviderIndex::from(0usize).to_string(), "0");
    }

    #[test]
    fn test_payload_with_error_fails() {
        let payload: DiscoveryPayload =
            serde_json::from_str(r#"{"error":"provider unreachable"}"#).unwrap();
        let err = payload.into_models().unwrap_err();
        assert!(matches!(err, ApiError::Application(ref m) if m == "provider unreachable"));
    }

    #[test]
    fn test_payload_with_error_and_models_still_fails() {
        let payload: DiscoveryPayload = serde_json::from_str(
            r#"{"models":[{"id":"gpt-4"}],"count":1,"error":"partial"}"#,
        )
        .unwrap();
        assert!(payload.into_models().is_err());
    }

    #[test]
    fn test_payload_drops_empty_and_duplicate_ids() {
        let payload: DiscoveryPayload = serde_json::from_str(
            r#"{"models":[
                {"id":"gpt-4","owned_by":"openai","object":"model"},
                {"id":""},
                {"id":"gpt-4","owned_by":"someone-else"},
                {"id":"gpt-3.5-turbo"}
            ],"count":4}"#,
        )
        .unwrap();
        let models = payload.into_models().unwrap();
        let ids: Vec<_> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["gpt-4", "gpt-3.5-turbo"]);
        assert_eq!(models[0].owned_by.as_deref(), Some("openai"));
    }

    #[test]
    fn test_missing_models_is_empty_list() {
        let payload: DiscoveryPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.into_models().unwrap().is_empty());
    }

    #[test]
    fn test_descriptor_label() {
        let mut model = ModelDescriptor::new("claude-3");
        assert_eq!(model.label(), "claude-3");
        model.owned_by = Some("anthropic".into());
        assert_eq!(model.label(), "claude-3 (anthropic)");
    }

    #[test]
    fn test_validation_payload_defaults_to_invalid() {
        let payload: ValidationPayload = serde_json::from_str(r#"{"error":"nope"}"#).unwrap();
        let result = ValidationResult::from_payload("x", payload);
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("nope"));
    }
}
