//! One-shot microphone permission probe
//!
//! The probe only surfaces the platform permission prompt before a call is
//! created. Audio for the call itself is captured by the calling SDK.

use crate::error::MicrophoneError;
use std::fmt;

/// An acquired microphone stream that is released when dropped
pub struct MicrophoneProbe {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl MicrophoneProbe {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release the underlying stream now
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for MicrophoneProbe {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl fmt::Debug for MicrophoneProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrophoneProbe")
            .field("held", &self.release.is_some())
            .finish()
    }
}

/// Platform microphone permission capability
#[async_trait::async_trait]
pub trait MicrophoneAccess: Send + Sync {
    /// Request microphone access, returning a live probe on success
    async fn request(&self) -> Result<MicrophoneProbe, MicrophoneError>;
}
