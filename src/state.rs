use std::sync::Arc;

use crate::application::services::ClicksService;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub clicks_service: Arc<ClicksService>,
}

impl AppState {
    pub fn new(clicks_service: Arc<ClicksService>) -> Self {
        Self { clicks_service }
    }
}
