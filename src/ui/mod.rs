//! UI contract — the coordinator's only way to change what the user sees.
//!
//! The coordinator emits [`UiEvent`]s into a [`UiSink`]; element lookup
//! and rendering belong to the sink. [`panels::ProviderPanels`] keeps
//! per-provider form state in memory, [`terminal::TerminalSink`] prints.

use serde::Serialize;
use std::fmt;

use crate::api::{ModelDescriptor, ProviderIndex};

pub mod panels;
pub mod terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Feedback text shown under a provider's model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub message: String,
    pub severity: Severity,
}

impl Feedback {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self { message: message.into(), severity }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Loading indicator shown (and refresh disabled) while `active`.
    Loading { provider: ProviderIndex, active: bool },
    /// Replace the provider's selectable model set.
    ModelsRendered { provider: ProviderIndex, models: Vec<ModelDescriptor> },
    Feedback { provider: ProviderIndex, feedback: Feedback },
    /// The free-text model list was rewritten programmatically.
    ModelListChanged { provider: ProviderIndex, text: String },
    ManualInputToggled { provider: ProviderIndex, manual: bool },
}

impl UiEvent {
    pub fn provider(&self) -> &ProviderIndex {
        match self {
            UiEvent::Loading { provider, .. }
            | UiEvent::ModelsRendered { provider, .. }
            | UiEvent::Feedback { provider, .. }
            | UiEvent::ModelListChanged { provider, .. }
            | UiEvent::ManualInputToggled { provider, .. } => provider,
        }
    }
}

pub trait UiSink: Send + Sync {
    fn emit(&self, event: UiEvent);
}

/// Emits `Loading { active: true }` on creation and `active: false` on
/// drop, so the indicator is cleared on every exit path.
pub(crate) struct LoadingGuard<'a> {
    sink: &'a dyn UiSink,
    provider: ProviderIndex,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn start(sink: &'a dyn UiSink, provider: &ProviderIndex) -> Self {
        sink.emit(UiEvent::Loading { provider: provider.clone(), active: true });
        Self { sink, provider: provider.clone() }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.sink.emit(UiEvent::Loading {
            provider: self.provider.clone(),
            active: false,
        });
    }
}
