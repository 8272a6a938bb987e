use std::sync::Arc;

use crate::config::AppConfig;
use crate::global_session_manager::GlobalSessionManager;
use crate::services::api_client::Transport;
use crate::services::guided_deployment::ScriptTiming;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub transport: Arc<dyn Transport>,
    pub session_manager: GlobalSessionManager,
    pub timing: ScriptTiming,
}

impl AppState {
    pub fn new(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        let session_manager = GlobalSessionManager::new().with_idle_timeout(config.session_idle_timeout);
        AppState {
            config: Arc::new(config),
            transport,
            session_manager,
            timing: ScriptTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: ScriptTiming) -> Self {
        self.timing = timing;
        self
    }
}
