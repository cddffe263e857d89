use crate::controller::CallController;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single call controller served by this process
    pub controller: Arc<CallController>,
}

impl AppState {
    pub fn new(controller: Arc<CallController>) -> Self {
        Self { controller }
    }
}
