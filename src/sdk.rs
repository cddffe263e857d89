//! Realtime calling SDK seam
//!
//! The SDK owns audio transport and session signaling. The controller only
//! starts and stops sessions and consumes the ordered event stream.

use crate::error::SdkError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Sample rate requested for every call
pub const CALL_SAMPLE_RATE: u32 = 24000;

/// Identifier of the platform default audio device
pub const DEFAULT_DEVICE_ID: &str = "default";

/// Parameters passed to the SDK's session start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallConfig {
    pub access_token: String,
    pub sample_rate: u32,
    pub capture_device_id: String,
    pub playback_device_id: String,
    pub emit_raw_audio_samples: bool,
}

impl StartCallConfig {
    /// Default audio parameters for the given token
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            sample_rate: CALL_SAMPLE_RATE,
            capture_device_id: DEFAULT_DEVICE_ID.to_string(),
            playback_device_id: DEFAULT_DEVICE_ID.to_string(),
            emit_raw_audio_samples: false,
        }
    }
}

/// Lifecycle, transcript and error events emitted by the SDK
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum CallEvent {
    CallStarted,
    CallEnded,
    AgentStartTalking,
    AgentStopTalking,
    /// Full transcript-so-far plus any other fields the SDK sends
    Update(Value),
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

impl CallEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CallEvent::CallStarted => "call_started",
            CallEvent::CallEnded => "call_ended",
            CallEvent::AgentStartTalking => "agent_start_talking",
            CallEvent::AgentStopTalking => "agent_stop_talking",
            CallEvent::Update(_) => "update",
            CallEvent::Error { .. } => "error",
        }
    }
}

/// Producer half of an event subscription, held by SDK implementations
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<CallEvent>,
}

impl EventSink {
    /// Deliver an event; returns false once the listener is gone
    pub fn emit(&self, event: CallEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Ordered stream of SDK events registered by the controller
#[derive(Debug)]
pub struct EventSubscription {
    rx: mpsc::UnboundedReceiver<CallEvent>,
}

impl EventSubscription {
    pub fn channel() -> (EventSink, EventSubscription) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink { tx }, EventSubscription { rx })
    }

    /// Next event in emission order, `None` once listeners are removed
    pub async fn next(&mut self) -> Option<CallEvent> {
        self.rx.recv().await
    }
}

/// Handle to the realtime calling SDK.
///
/// Implementations allow at most one active session.
#[async_trait::async_trait]
pub trait CallSdk: Send + Sync {
    /// Start a session; may return before the session is negotiated
    async fn start_call(&self, config: &StartCallConfig) -> Result<(), SdkError>;

    /// Stop the current session, if any
    async fn stop_call(&self) -> Result<(), SdkError>;

    /// Register a listener for all SDK events
    fn subscribe(&self) -> EventSubscription;

    /// Detach every registered listener
    fn remove_all_listeners(&self);
}
