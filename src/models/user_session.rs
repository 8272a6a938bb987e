use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use crate::config::AppConfig;
use crate::models::user::User;
use crate::notifications::NoticeQueue;
use crate::services::api_client::{ApiClient, Transport};
use crate::services::deploy_agent_chat::DeployAgentChat;
use crate::services::guided_deployment::{GuidedDeployment, ScriptTiming};
use crate::token_storage::{CookieJarStore, FileStore, TokenStorage};

/// Everything one browser session owns on the console server.
pub struct UserSession {
    pub client: ApiClient,
    pub events: Arc<NoticeQueue>,
    pub user: Option<User>,
    pub guided: GuidedDeployment,
    pub deploy_agent: DeployAgentChat,
}

impl UserSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: TokenStorage,
        timing: ScriptTiming,
        github_token: Option<String>,
    ) -> Self {
        let events = Arc::new(NoticeQueue::new());
        UserSession {
            client: ApiClient::new(transport, Arc::new(tokens), events.clone()),
            events,
            user: None,
            guided: GuidedDeployment::new(timing).with_github_token(github_token),
            deploy_agent: DeployAgentChat::new(),
        }
    }

    /// A session whose tokens live in `<token_dir>/<session_id>.json`, so a
    /// returning browser keeps its sign-in across server restarts.
    pub fn persistent(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        session_id: &str,
        timing: ScriptTiming,
    ) -> Self {
        let tokens = TokenStorage::new(
            FileStore::new(token_file(&config.token_dir, session_id)),
            CookieJarStore::new(config.production),
        );
        Self::new(transport, tokens, timing, config.github_token.clone())
    }

    /// A user only counts as signed in while an access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.client.tokens().access_token().is_some()
    }

    /// Drops the cached profile once the client has cleared the tokens, as
    /// it does after a failed refresh.
    pub fn sync_sign_in(&mut self) -> Option<&User> {
        if self.user.is_some() && self.client.tokens().access_token().is_none() {
            info!("Tokens are gone, signing the session out");
            self.user = None;
        }
        self.user.as_ref()
    }
}

pub fn token_file(token_dir: &Path, session_id: &str) -> PathBuf {
    token_dir.join(format!("{}.json", session_id))
}

/// Deletes a session's token file. A file that was never written is fine.
pub fn remove_token_file(token_dir: &Path, session_id: &str) {
    let path = token_file(token_dir, session_id);
    match std::fs::remove_file(&path) {
        Ok(()) => info!("Removed token file {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove token file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api_client::{ApiRequest, RawResponse, TransportError};
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl Transport for Offline {
        async fn execute(&self, _request: &ApiRequest) -> Result<RawResponse, TransportError> {
            Err(TransportError::Network("offline".to_string()))
        }
    }

    fn signed_in() -> UserSession {
        let mut session =
            UserSession::new(Arc::new(Offline), TokenStorage::in_memory(), ScriptTiming::instant(), None);
        session.client.tokens().set_access_token("a1").unwrap();
        session.user = Some(User {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            is_email_verified: true,
        });
        session
    }

    #[test]
    fn cleared_tokens_sign_the_user_out() {
        let mut session = signed_in();
        assert!(session.is_authenticated());

        session.client.tokens().clear_tokens().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.sync_sign_in().is_none());
        assert!(session.user.is_none());
    }

    #[test]
    fn stored_tokens_keep_the_user() {
        let mut session = signed_in();
        assert_eq!(session.sync_sign_in().map(|u| u.id.as_str()), Some("u1"));
    }

    #[test]
    fn removing_a_missing_token_file_is_quiet() {
        let dir = std::env::temp_dir().join(format!("donedep-token-files-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(token_file(&dir, "s1"), "{}").unwrap();

        remove_token_file(&dir, "s1");
        remove_token_file(&dir, "s1");

        assert!(!token_file(&dir, "s1").exists());
    }
}
