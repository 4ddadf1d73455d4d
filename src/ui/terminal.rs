//! Console rendering for the CLI: plain lines or JSON lines.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::{UiEvent, UiSink};

pub struct TerminalSink<W = io::Stdout> {
    out: Mutex<W>,
    json: bool,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(io::stdout(), json)
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out: Mutex::new(out), json }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{line}") {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    fn render_json(&self, event: &UiEvent) -> Option<String> {
        let value = match event {
            UiEvent::Loading { .. } | UiEvent::ManualInputToggled { .. } => return None,
            UiEvent::ModelsRendered { provider, models } => serde_json::json!({
                "event": "models",
                "provider": provider,
                "models": models,
            }),
            UiEvent::Feedback { provider, feedback } => serde_json::json!({
                "event": "feedback",
                "provider": provider,
                "severity": feedback.severity,
                "message": feedback.message,
            }),
            UiEvent::ModelListChanged { provider, text } => serde_json::json!({
                "event": "model_list",
                "provider": provider,
                "text": text,
            }),
        };
        Some(value.to_string())
    }

    fn render_plain(&self, event: &UiEvent) -> Option<String> {
        match event {
            UiEvent::Loading { provider, active } => {
                if *active {
                    info!(provider = %provider, "⏳ Loading models...");
                } else {
                    debug!(provider = %provider, "Loading finished");
                }
                None
            }
            UiEvent::ManualInputToggled { provider, manual } => {
                info!(provider = %provider, manual, "Manual input toggled");
                None
            }
            UiEvent::ModelsRendered { models, .. } => Some(
                models
                    .iter()
                    .map(|m| format!("  {}", m.label()))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
            .filter(|s| !s.is_empty()),
            UiEvent::Feedback { feedback, .. } => {
                Some(format!("[{}] {}", feedback.severity, feedback.message))
            }
            UiEvent::ModelListChanged { text, .. } => Some(format!("models: {text}")),
        }
    }
}

impl<W: Write + Send> UiSink for TerminalSink<W> {
    fn emit(&self, event: UiEvent) {
        let line = if self.json {
            self.render_json(&event)
        } else {
            self.render_plain(&event)
        };
        if let Some(line) = line {
            self.write_line(&line);
        }
    }
}
