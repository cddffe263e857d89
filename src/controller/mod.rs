//! Call session control
//!
//! This module provides the `CallController` that mediates between a
//! presentation layer and the realtime calling SDK:
//! - Microphone permission probe and access token acquisition
//! - Session start/stop with a generation guard against stale completions
//! - In-order handling of SDK lifecycle, transcript and error events
//! - A derived snapshot (status, active flag, transcript) for rendering

mod config;
mod controller;
mod state;
mod status;

pub use config::ControllerConfig;
pub use controller::CallController;
pub use state::{CallSnapshot, EventOutcome, SessionState, StartCompletion};
pub use status::CallStatus;
