use crate::error::{MicrophoneError, SdkError};
use serde::{Deserialize, Serialize};

/// Reply to a microphone permission request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionReply {
    pub granted: bool,
    /// Set when the probe failed for a reason other than refusal
    #[serde(default)]
    pub error: Option<String>,
}

impl PermissionReply {
    /// Refusal without a reason is a user denial; any reason means the
    /// probe itself failed
    pub fn into_result(self) -> Result<(), MicrophoneError> {
        match (self.granted, self.error) {
            (true, _) => Ok(()),
            (false, None) => Err(MicrophoneError::Denied),
            (false, Some(message)) => Err(MicrophoneError::Unavailable(message)),
        }
    }
}

/// Reply to a start or stop command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReply {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl CommandReply {
    pub fn into_result(self, action: &str) -> Result<(), SdkError> {
        if self.ok {
            return Ok(());
        }
        Err(SdkError::new(
            self.error
                .unwrap_or_else(|| format!("Bridge rejected {}", action)),
        ))
    }
}

/// Subject names for one bridge instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subjects {
    pub microphone: String,
    pub microphone_release: String,
    pub start: String,
    pub stop: String,
    pub events: String,
}

impl Subjects {
    pub fn for_bridge(bridge_id: &str) -> Self {
        let prefix = format!("call.{}", bridge_id);
        Self {
            microphone: format!("{}.microphone", prefix),
            microphone_release: format!("{}.microphone.release", prefix),
            start: format!("{}.start", prefix),
            stop: format!("{}.stop", prefix),
            events: format!("{}.events", prefix),
        }
    }
}
