//! Provider model discovery & validation coordinator.
//!
//! For each provider configured in a multi-provider proxy's admin surface,
//! discovers the available model ids, merges user selections into the
//! free-text model list, and validates entered ids against the provider.
//!
//! - [`api`] — the discovery/validation endpoints behind [`api::ModelsApi`]
//! - [`cache`] — per-provider model cache and in-flight validation set
//! - [`coordinator`] — the operations
//! - [`ui`] — events the coordinator emits and the sinks that render them

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod ui;

pub use api::{ModelDescriptor, ModelsApi, ProviderIndex, ValidationResult};
pub use coordinator::{Coordinator, CoordinatorOptions};
pub use error::ApiError;
pub use ui::{Feedback, Severity, UiEvent, UiSink};
