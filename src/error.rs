//! Error types for call session control

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback message when the token service fails without explaining why
pub const TOKEN_FALLBACK_MESSAGE: &str = "Failed to get access token";

/// Fallback message for SDK errors that carry no message
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Result type for call controller operations
pub type CallResult<T> = Result<T, CallError>;

/// Errors raised while starting, running or stopping a call
#[derive(Debug, Error)]
pub enum CallError {
    /// Microphone access was refused by the user or platform
    #[error("Microphone access denied")]
    PermissionDenied,

    /// Microphone probe failed for a reason other than refusal
    #[error("{message}")]
    Microphone { message: String },

    /// Token service unreachable, malformed response, or explicit failure flag
    #[error("{message}")]
    TokenAcquisition { message: String },

    /// The SDK rejected the session start
    #[error("{message}")]
    SessionStart { message: String },

    /// The SDK emitted an `error` event during a call
    #[error("{message}")]
    SessionRuntime { message: String },

    /// The SDK failed to stop the session (non-fatal)
    #[error("{message}")]
    Stop { message: String },
}

/// Coarse classification of a [`CallError`], exposed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    Microphone,
    TokenAcquisition,
    SessionStart,
    SessionRuntime,
    Stop,
}

impl CallError {
    pub fn token(message: impl Into<String>) -> Self {
        Self::TokenAcquisition {
            message: message.into(),
        }
    }

    pub fn session_start(message: impl Into<String>) -> Self {
        Self::SessionStart {
            message: message.into(),
        }
    }

    /// Build a runtime error from an optional SDK message
    pub fn runtime(message: Option<&str>) -> Self {
        let message = match message {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => UNKNOWN_ERROR_MESSAGE.to_string(),
        };
        Self::SessionRuntime { message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied => ErrorKind::PermissionDenied,
            Self::Microphone { .. } => ErrorKind::Microphone,
            Self::TokenAcquisition { .. } => ErrorKind::TokenAcquisition,
            Self::SessionStart { .. } => ErrorKind::SessionStart,
            Self::SessionRuntime { .. } => ErrorKind::SessionRuntime,
            Self::Stop { .. } => ErrorKind::Stop,
        }
    }
}

/// Failure to acquire the microphone probe
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MicrophoneError {
    #[error("microphone access denied")]
    Denied,

    #[error("microphone unavailable: {0}")]
    Unavailable(String),
}

impl From<MicrophoneError> for CallError {
    fn from(err: MicrophoneError) -> Self {
        match err {
            MicrophoneError::Denied => CallError::PermissionDenied,
            MicrophoneError::Unavailable(message) => CallError::Microphone { message },
        }
    }
}

/// Error reported by a calling SDK operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SdkError {
    pub message: String,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
