use crate::campaign::CampaignWindow;
use crate::store::ProgressStore;
use std::sync::Arc;

/// Shared application state passed to all route handlers. The store is
/// constructed once at startup and injected, never reached through a
/// module-level global, so tests can substitute their own.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProgressStore>,
    pub campaign: CampaignWindow,
}

impl AppState {
    pub fn new(store: Arc<dyn ProgressStore>, campaign: CampaignWindow) -> Self {
        Self { store, campaign }
    }
}
