use crate::error::CallError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-facing phase of the call controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    Idle,
    RequestingPermission,
    CreatingSession,
    /// Start returned; waiting for `call_started`
    Connecting,
    Active,
    Ended,
    Stopped,
    PermissionDenied,
    Error(String),
}

impl CallStatus {
    /// Status shown after a failed action
    pub fn from_error(err: &CallError) -> Self {
        match err {
            CallError::PermissionDenied => CallStatus::PermissionDenied,
            other => CallStatus::Error(other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CallStatus::PermissionDenied | CallStatus::Error(_))
    }

    /// Whether a start is underway but the session is not yet live
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            CallStatus::RequestingPermission | CallStatus::CreatingSession | CallStatus::Connecting
        )
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStatus::Idle => write!(f, "Ready to call"),
            CallStatus::RequestingPermission => write!(f, "Requesting microphone access..."),
            CallStatus::CreatingSession => write!(f, "Creating call..."),
            CallStatus::Connecting => write!(f, "Call starting..."),
            CallStatus::Active => write!(f, "Call active - Say something!"),
            CallStatus::Ended => write!(f, "Call ended"),
            CallStatus::Stopped => write!(f, "Call stopped"),
            CallStatus::PermissionDenied => write!(
                f,
                "Microphone access denied. Please allow microphone access and try again."
            ),
            CallStatus::Error(message) => write!(f, "Error: {}", message),
        }
    }
}
