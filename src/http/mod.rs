//! HTTP API for a presentation layer
//!
//! This module exposes the call controller over REST:
//! - GET /call - Current call snapshot
//! - GET /call/transcript - Transcript text
//! - POST /call/start - Start a call
//! - POST /call/stop - Stop the call
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
