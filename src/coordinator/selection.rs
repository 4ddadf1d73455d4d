//! Selection — merge a picked model into the free-text model list.

use tracing::debug;

use super::Coordinator;
use crate::api::ProviderIndex;
use crate::ui::UiEvent;

const SEPARATOR: &str = ", ";

/// Split a comma-separated list, trimming and dropping empty entries.
/// Duplicates are kept.
pub fn parse_model_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Append `selected` unless it is already listed. Never removes entries.
pub fn merge_selection(text: &str, selected: &str) -> String {
    let mut models = parse_model_list(text);
    if !models.iter().any(|m| m == selected) {
        models.push(selected.to_string());
    }
    models.join(SEPARATOR)
}

impl Coordinator {
    /// Add a model picked from the dropdown to the provider's list and
    /// validate the result. Returns the rewritten list, or `None` when
    /// nothing was selected.
    pub async fn handle_model_selection(
        &self,
        provider: &ProviderIndex,
        current_text: &str,
        selected: &str,
    ) -> Option<String> {
        let selected = selected.trim();
        if selected.is_empty() {
            return None;
        }

        let text = merge_selection(current_text, selected);
        debug!(provider = %provider, model = %selected, list = %text, "Model selected");
        self.sink.emit(UiEvent::ModelListChanged {
            provider: provider.clone(),
            text: text.clone(),
        });

        self.validate_models(provider, &text).await;
        Some(text)
    }
}
