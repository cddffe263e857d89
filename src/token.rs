//! Access token acquisition from the web-call backend

use crate::error::{CallError, CallResult, TOKEN_FALLBACK_MESSAGE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Response body of `POST /create-web-call`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub access_token: Option<String>,

    /// Service-provided failure description
    #[serde(default)]
    pub error: Option<String>,
}

impl TokenResponse {
    /// Resolve the response into a usable token.
    ///
    /// Fails unless `success` is set and a non-empty token is present.
    pub fn into_token(self) -> CallResult<String> {
        match self.access_token {
            Some(token) if self.success && !token.is_empty() => Ok(token),
            _ => Err(CallError::token(
                self.error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| TOKEN_FALLBACK_MESSAGE.to_string()),
            )),
        }
    }
}

/// Issues single-use access tokens for new call sessions
#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    async fn create_web_call(&self) -> CallResult<String>;
}

/// Token service reached over HTTP
pub struct HttpTokenService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTokenService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CallResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CallError::token(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint URL with a millisecond cache-busting parameter
    pub fn endpoint(&self, timestamp_ms: i64) -> String {
        format!("{}/create-web-call?t={}", self.base_url, timestamp_ms)
    }
}

#[async_trait::async_trait]
impl TokenService for HttpTokenService {
    async fn create_web_call(&self) -> CallResult<String> {
        let url = self.endpoint(chrono::Utc::now().timestamp_millis());
        debug!("Requesting access token from {}", url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| CallError::token(format!("Token service unreachable: {}", e)))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CallError::token(format!("Malformed token response: {}", e)))?;

        body.into_token()
    }
}
