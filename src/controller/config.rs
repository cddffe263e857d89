use crate::sdk::{StartCallConfig, CALL_SAMPLE_RATE, DEFAULT_DEVICE_ID};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a call controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Name used in log output
    pub name: String,

    /// Audio sample rate requested from the SDK
    /// Default: 24000 Hz
    pub sample_rate: u32,

    /// Capture device passed to the SDK
    pub capture_device_id: String,

    /// Playback device passed to the SDK
    pub playback_device_id: String,

    /// Whether the SDK should emit raw audio samples
    pub emit_raw_audio_samples: bool,

    /// How long an active call may outlive an SDK `error` event without a
    /// `call_ended` before it is treated as dead
    /// Default: 5 seconds
    pub error_grace: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            name: "voice-call".to_string(),
            sample_rate: CALL_SAMPLE_RATE,
            capture_device_id: DEFAULT_DEVICE_ID.to_string(),
            playback_device_id: DEFAULT_DEVICE_ID.to_string(),
            emit_raw_audio_samples: false,
            error_grace: Duration::from_secs(5),
        }
    }
}

impl ControllerConfig {
    /// SDK start parameters for the given access token
    pub fn start_config(&self, access_token: String) -> StartCallConfig {
        StartCallConfig {
            access_token,
            sample_rate: self.sample_rate,
            capture_device_id: self.capture_device_id.clone(),
            playback_device_id: self.playback_device_id.clone(),
            emit_raw_audio_samples: self.emit_raw_audio_samples,
        }
    }
}
