//! Injectable observability hooks for the call controller

use crate::controller::CallStatus;
use crate::error::CallError;
use crate::sdk::CallEvent;
use tracing::{debug, error, info, warn};

/// Receives controller activity for logging or metrics
pub trait CallObserver: Send + Sync {
    fn status_changed(&self, _from: &CallStatus, _to: &CallStatus) {}

    fn event_received(&self, _event: &CallEvent) {}

    /// An event that arrived for an abandoned or unknown session
    fn event_ignored(&self, _event: &CallEvent, _reason: &str) {}

    fn action_failed(&self, _action: &str, _error: &CallError) {}

    fn note(&self, _message: &str) {}
}

/// Observer that discards everything
pub struct NoopObserver;

impl CallObserver for NoopObserver {}

/// Observer that forwards to `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    name: String,
}

impl TracingObserver {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CallObserver for TracingObserver {
    fn status_changed(&self, from: &CallStatus, to: &CallStatus) {
        info!(controller = %self.name, "call status: {} -> {}", from, to);
    }

    fn event_received(&self, event: &CallEvent) {
        match event {
            CallEvent::Update(update) => {
                debug!(controller = %self.name, event = event.name(), "Received update: {}", update)
            }
            CallEvent::Error { message } => {
                error!(controller = %self.name, event = event.name(), ?message, "SDK error")
            }
            _ => info!(controller = %self.name, event = event.name(), "SDK event"),
        }
    }

    fn event_ignored(&self, event: &CallEvent, reason: &str) {
        warn!(controller = %self.name, event = event.name(), "Ignoring event: {}", reason);
    }

    fn action_failed(&self, action: &str, err: &CallError) {
        match err {
            CallError::Stop { .. } => warn!(controller = %self.name, action, "{}", err),
            _ => error!(controller = %self.name, action, kind = ?err.kind(), "{}", err),
        }
    }

    fn note(&self, message: &str) {
        info!(controller = %self.name, "{}", message);
    }
}
