//! Validation — check user-entered model ids against the provider.

use futures::future::join_all;
use std::sync::atomic::Ordering;
use std::sync::PoisonError;
use tracing::{debug, warn};

use super::selection::parse_model_list;
use super::Coordinator;
use crate::api::{ProviderIndex, ValidationResult};
use crate::cache::in_flight::FlightGuard;
use crate::ui::{Feedback, UiEvent};

impl Coordinator {
    /// Validate a comma-separated model list.
    ///
    /// Tokens whose (provider, model) pair is already being validated are
    /// skipped. The rest are checked concurrently and one aggregate
    /// feedback is written after all settle. Returns the feedback written,
    /// or `None` when nothing was dispatched or the write was superseded.
    pub async fn validate_models(
        &self,
        provider: &ProviderIndex,
        models_text: &str,
    ) -> Option<Feedback> {
        let tokens = parse_model_list(models_text);
        if tokens.is_empty() {
            return None;
        }

        let seq = self.validation_seq.fetch_add(1, Ordering::SeqCst);

        // Keys are claimed here, before the first await.
        let checks: Vec<_> = tokens
            .iter()
            .filter_map(|model| match self.in_flight.try_acquire(provider, model) {
                Some(guard) => Some(self.check_model(provider, guard)),
                None => {
                    debug!(provider = %provider, model = %model, "Validation already in flight — skipping");
                    None
                }
            })
            .collect();

        if checks.is_empty() {
            return None;
        }

        let results = join_all(checks).await;
        let feedback = summarize(&results)?;

        if self.options.discard_stale_feedback && self.is_superseded(provider, seq) {
            debug!(provider = %provider, seq, "Discarding superseded validation feedback");
            return None;
        }

        self.sink.emit(UiEvent::Feedback {
            provider: provider.clone(),
            feedback: feedback.clone(),
        });
        Some(feedback)
    }

    /// One request; the guard releases the key when this returns.
    async fn check_model(
        &self,
        provider: &ProviderIndex,
        guard: FlightGuard<'_>,
    ) -> ValidationResult {
        let model = guard.model();
        match self.api.validate(provider, model).await {
            Ok(payload) => ValidationResult::from_payload(model, payload),
            Err(e) => {
                warn!(
                    session = %self.session_id,
                    provider = %provider,
                    model = %model,
                    "Validation request failed: {}", e
                );
                ValidationResult::failed(model, &e)
            }
        }
    }

    /// Record `seq` as settled unless a newer call already wrote.
    fn is_superseded(&self, provider: &ProviderIndex, seq: u64) -> bool {
        let mut settled = self.settled.lock().unwrap_or_else(PoisonError::into_inner);
        let newest = settled.entry(provider.clone()).or_insert(seq);
        if *newest > seq {
            return true;
        }
        *newest = seq;
        false
    }
}

/// Aggregate per-model results into one feedback line.
///
/// All invalid → error listing them; all valid → success with the count;
/// mixed → warning with counts and `model (reason)` pairs. `None` for an
/// empty result set.
pub fn summarize(results: &[ValidationResult]) -> Option<Feedback> {
    let (valid, invalid): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.valid);

    match (valid.len(), invalid.len()) {
        (0, 0) => None,
        (0, _) => {
            let names: Vec<&str> = invalid.iter().map(|r| r.model.as_str()).collect();
            let label = if names.len() == 1 { "Invalid model" } else { "Invalid models" };
            Some(Feedback::error(format!("{label}: {}", names.join(", "))))
        }
        (1, 0) => Some(Feedback::success("1 model valid")),
        (n, 0) => Some(Feedback::success(format!("All {n} models valid"))),
        (n, m) => {
            let reasons: Vec<String> = invalid
                .iter()
                .map(|r| format!("{} ({})", r.model, r.error.as_deref().unwrap_or("invalid")))
                .collect();
            Some(Feedback::warning(format!(
                "{n} valid, {m} invalid: {}",
                reasons.join(", ")
            )))
        }
    }
}
