//! Discovery — fetch a provider's model list and render it.

use tracing::{debug, info, warn};

use super::Coordinator;
use crate::api::ProviderIndex;
use crate::ui::{Feedback, LoadingGuard, UiEvent};

impl Coordinator {
    /// Refresh one provider's model list.
    ///
    /// On success the cache entry is replaced wholesale and the count is
    /// returned. Transport failures, non-2xx responses and payloads with an
    /// `error` field all leave the cache untouched and surface as error
    /// feedback. The loading state is cleared on every path.
    pub async fn refresh_models(&self, provider: &ProviderIndex) -> Option<usize> {
        let _loading = LoadingGuard::start(self.sink.as_ref(), provider);
        info!(session = %self.session_id, provider = %provider, "📡 Discovering models...");

        let outcome = match self.api.discover(provider).await {
            Ok(payload) => {
                let reported = payload.count;
                payload.into_models().inspect(|models| {
                    if reported.is_some_and(|count| count != models.len()) {
                        debug!(
                            provider = %provider,
                            reported = ?reported,
                            received = models.len(),
                            "Discovery count differs from model list"
                        );
                    }
                })
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(models) => {
                let count = models.len();
                self.cache.replace(provider.clone(), models.clone());
                self.sink.emit(UiEvent::ModelsRendered {
                    provider: provider.clone(),
                    models,
                });
                self.sink.emit(UiEvent::Feedback {
                    provider: provider.clone(),
                    feedback: Feedback::success(format!("Found {}", models_noun(count))),
                });
                info!(session = %self.session_id, provider = %provider, count, "📡 Discovery complete");
                Some(count)
            }
            Err(e) => {
                warn!(session = %self.session_id, provider = %provider, "Discovery failed: {}", e);
                self.sink.emit(UiEvent::Feedback {
                    provider: provider.clone(),
                    feedback: Feedback::error(format!("Failed to discover models: {e}")),
                });
                None
            }
        }
    }
}

/// `1 model`, `3 models`.
pub(crate) fn models_noun(count: usize) -> String {
    if count == 1 {
        "1 model".to_string()
    } else {
        format!("{count} models")
    }
}
