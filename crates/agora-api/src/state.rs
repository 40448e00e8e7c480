use std::sync::Arc;
use agora_persist::Forum;
use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forum: Forum,
}

impl AppState {
    pub fn new(config: Config, forum: Forum) -> Self {
        Self {
            config: Arc::new(config),
            forum,
        }
    }
}
