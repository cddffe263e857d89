use crate::controller::ControllerConfig;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub token_service: TokenServiceConfig,
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub call: CallConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct TokenServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct BridgeConfig {
    pub nats_url: String,
    /// Generated per process when absent
    #[serde(default)]
    pub bridge_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    pub sample_rate: u32,
    pub capture_device_id: String,
    pub playback_device_id: String,
    pub emit_raw_audio_samples: bool,
    pub error_grace_ms: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for CallConfig {
    fn default() -> Self {
        let defaults = ControllerConfig::default();
        Self {
            sample_rate: defaults.sample_rate,
            capture_device_id: defaults.capture_device_id,
            playback_device_id: defaults.playback_device_id,
            emit_raw_audio_samples: defaults.emit_raw_audio_samples,
            error_grace_ms: defaults.error_grace.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load from a config file, with `VOICE_CALL__SECTION__KEY` overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("VOICE_CALL").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_service.timeout_secs)
    }

    pub fn bridge_id(&self) -> String {
        self.bridge
            .bridge_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            name: self.service.name.clone(),
            sample_rate: self.call.sample_rate,
            capture_device_id: self.call.capture_device_id.clone(),
            playback_device_id: self.call.playback_device_id.clone(),
            emit_raw_audio_samples: self.call.emit_raw_audio_samples,
            error_grace: Duration::from_millis(self.call.error_grace_ms),
        }
    }
}
