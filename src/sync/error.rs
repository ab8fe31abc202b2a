//! Transient error channel: a single-slot holder for the most recent
//! failed response, auto-clearing after a bounded window.

use serde_json::Value;
use std::time::{Duration, Instant};

use crate::client::ApiError;

const DEFAULT_WINDOW: Duration = Duration::from_millis(5000);

/// Failed network response, reduced to what the alert layer needs.
/// Transport-level failures carry status 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
}

impl FailedResponse {
    pub fn severity(&self) -> Severity {
        if self.status >= 500 {
            Severity::Error
        } else if self.status >= 400 {
            Severity::Warning
        } else if self.status >= 200 {
            Severity::Success
        } else {
            Severity::Unknown
        }
    }

    /// Display message, by priority: a structured `detail` field, then
    /// `__all__`, then `non_field_errors`, then the transport status text.
    pub fn message(&self) -> String {
        for field in ["detail", "__all__", "non_field_errors"] {
            if let Some(value) = self.body.get(field) {
                return value_text(value);
            }
        }
        self.status_text.clone()
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Status-code bucket driving alert styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Success,
    Unknown,
}

/// Single-slot holder. A new write overwrites the previous value and
/// restarts the countdown; the slot reads as empty once the window has
/// elapsed without another write.
#[derive(Debug)]
pub struct ErrorSlot {
    window: Duration,
    slot: Option<(FailedResponse, Instant)>,
}

impl Default for ErrorSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self { window, slot: None }
    }

    pub fn set(&mut self, response: FailedResponse) {
        self.slot = Some((response, Instant::now()));
    }

    pub fn record(&mut self, err: &ApiError) {
        self.set(err.to_failed_response());
    }

    /// The held response, if the window has not elapsed since the last
    /// write. An expired value is dropped on read.
    pub fn current(&mut self) -> Option<&FailedResponse> {
        if let Some((_, written_at)) = self.slot {
            if written_at.elapsed() >= self.window {
                self.slot = None;
            }
        }
        self.slot.as_ref().map(|(response, _)| response)
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
