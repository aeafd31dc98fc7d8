use std::sync::Arc;

use actors::Coordinator;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub coordinator: Coordinator,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(coordinator: Coordinator, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            coordinator,
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
