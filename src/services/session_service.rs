//! Sign-in state of one console session: what happens around the auth
//! endpoints (storing tokens, telling the user, clearing up on failure).

use log::{error, info, warn};

use crate::models::user::{AuthData, LoginRequest, RegisterRequest, User};
use crate::notifications::Notice;
use crate::services::api_client::{ApiClient, ApiError};
use crate::services::auth_service;

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const REGISTER_SUCCESS: &str =
    "Registration successful! Please check your email to verify your account.";
pub const LOGOUT_SUCCESS: &str = "Logged out successfully";
pub const VERIFY_SUCCESS: &str = "Email verified successfully!";
pub const INVALID_VERIFICATION_LINK: &str =
    "Invalid verification link. Please check your email for the correct link.";
pub const VERIFICATION_FAILED: &str = "Email verification failed. Please try again.";
pub const VERIFICATION_UNREACHABLE: &str =
    "Email verification failed. The link may be expired or invalid.";

/// Loads the signed-in user if a token is stored. Any failure drops the
/// stored tokens and leaves the session signed out.
pub async fn initialize(client: &ApiClient) -> Option<User> {
    client.tokens().access_token()?;

    match auth_service::get_profile(client).await {
        Ok(response) if response.success && response.data.is_some() => response.data,
        Ok(_) => {
            info!("Profile request was rejected, clearing stored tokens");
            clear_tokens(client);
            None
        }
        Err(e) => {
            error!("Auth initialization failed: {}", e);
            clear_tokens(client);
            None
        }
    }
}

pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<User, ApiError> {
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };

    let response = match auth_service::login(client, &request).await {
        Ok(response) => response,
        Err(e) => return Err(report(client, e, "Login failed")),
    };

    match response.data {
        Some(AuthData {
            token: Some(token),
            refresh_token,
            user: Some(user),
        }) if response.success => {
            store_tokens(client, &token, refresh_token.as_deref());
            info!("User {} signed in", user.id);
            client.events().notify(Notice::success(LOGIN_SUCCESS));
            Ok(user)
        }
        _ => {
            let message = response.message.unwrap_or_else(|| "Login failed".to_string());
            Err(report(client, ApiError::Rejected(message), "Login failed"))
        }
    }
}

pub async fn register(client: &ApiClient, email: &str, password: &str, name: &str) -> Result<(), ApiError> {
    let request = RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        name: name.to_string(),
    };

    match auth_service::register(client, &request).await {
        Ok(response) if response.success => {
            client.events().notify(Notice::success(REGISTER_SUCCESS));
            Ok(())
        }
        Ok(response) => {
            let message = response.message.unwrap_or_else(|| "Registration failed".to_string());
            Err(report(client, ApiError::Rejected(message), "Registration failed"))
        }
        Err(e) => Err(report(client, e, "Registration failed")),
    }
}

/// Always ends signed out, whatever the API says.
pub async fn logout(client: &ApiClient) {
    if let Err(e) = auth_service::logout(client).await {
        error!("Logout error: {}", e);
    }
    clear_tokens(client);
    client.events().notify(Notice::success(LOGOUT_SUCCESS));
}

pub async fn verify_email(client: &ApiClient, token: &str) -> Result<Option<User>, ApiError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::Rejected(INVALID_VERIFICATION_LINK.to_string()));
    }

    match auth_service::verify_email(client, token).await {
        Ok(response) if response.success => {
            let data = response.data.unwrap_or_default();
            if let Some(access_token) = data.token.as_deref() {
                store_tokens(client, access_token, data.refresh_token.as_deref());
            }
            client.events().notify(Notice::success(VERIFY_SUCCESS));
            Ok(data.user)
        }
        Ok(response) => Err(ApiError::Rejected(
            response.message.unwrap_or_else(|| VERIFICATION_FAILED.to_string()),
        )),
        Err(e) => {
            warn!("Email verification request failed: {}", e);
            if !e.is_notified() {
                client.events().notify(Notice::error(VERIFICATION_UNREACHABLE));
            }
            Err(ApiError::Rejected(VERIFICATION_UNREACHABLE.to_string()))
        }
    }
}

/// Exchanges the stored refresh token on demand. Signs out when there is
/// nothing to exchange or the exchange fails.
pub async fn refresh_session(client: &ApiClient) -> bool {
    let refresh_token = match client.tokens().refresh_token() {
        Some(token) => token,
        None => {
            error!("Token refresh failed: no refresh token available");
            logout(client).await;
            return false;
        }
    };

    let refreshed = match auth_service::refresh_token(client, &refresh_token).await {
        Ok(response) if response.success => response.access_token().map(String::from),
        Ok(_) => None,
        Err(e) => {
            error!("Token refresh failed: {}", e);
            None
        }
    };

    match refreshed {
        Some(token) => {
            if let Err(e) = client.tokens().set_access_token(&token) {
                warn!("Refreshed access token could not be stored: {}", e);
            }
            true
        }
        None => {
            logout(client).await;
            false
        }
    }
}

fn store_tokens(client: &ApiClient, access_token: &str, refresh_token: Option<&str>) {
    if let Err(e) = client.tokens().set_access_token(access_token) {
        warn!("Access token could not be stored: {}", e);
    }
    if let Some(refresh_token) = refresh_token {
        if let Err(e) = client.tokens().set_refresh_token(refresh_token) {
            warn!("Refresh token could not be stored: {}", e);
        }
    }
}

fn clear_tokens(client: &ApiClient) {
    if let Err(e) = client.tokens().clear_tokens() {
        warn!("Failed to clear stored tokens: {}", e);
    }
}

/// Tells the user about `err` unless the client already did.
fn report(client: &ApiClient, err: ApiError, fallback: &str) -> ApiError {
    if !err.is_notified() {
        client.events().notify(Notice::error(err.user_message(fallback)));
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NoticeQueue;
    use crate::services::api_client::{ApiRequest, RawResponse, Transport, TransportError};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use crate::token_storage::TokenStorage;

    /// Replies with a fixed response per path.
    struct FixedTransport {
        replies: Vec<(&'static str, StatusCode, Value)>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
            self.seen.lock().unwrap().push(request.path.clone());
            self.replies
                .iter()
                .find(|(path, _, _)| *path == request.path)
                .map(|(_, status, body)| RawResponse::json(*status, body.clone()))
                .ok_or_else(|| TransportError::Network("connection refused".to_string()))
        }
    }

    fn client(replies: Vec<(&'static str, StatusCode, Value)>) -> (ApiClient, Arc<NoticeQueue>) {
        let transport = Arc::new(FixedTransport {
            replies,
            seen: Mutex::new(Vec::new()),
        });
        let events = Arc::new(NoticeQueue::new());
        let client = ApiClient::new(transport, Arc::new(TokenStorage::in_memory()), events.clone());
        (client, events)
    }

    fn user_json() -> Value {
        json!({ "id": "u1", "email": "ada@example.com", "name": "Ada", "isEmailVerified": true })
    }

    #[tokio::test]
    async fn login_stores_tokens_and_notifies() {
        let (client, events) = client(vec![(
            "/auth/login",
            StatusCode::OK,
            json!({ "success": true, "data": { "token": "a1", "refreshToken": "r1", "user": user_json() } }),
        )]);

        let user = login(&client, "ada@example.com", "pw").await.unwrap();

        assert_eq!(user.name, "Ada");
        assert_eq!(client.tokens().access_token().as_deref(), Some("a1"));
        assert_eq!(client.tokens().refresh_token().as_deref(), Some("r1"));
        assert_eq!(events.drain(), vec![Notice::success(LOGIN_SUCCESS)]);
    }

    #[tokio::test]
    async fn rejected_login_reports_server_message() {
        let (client, events) = client(vec![(
            "/auth/login",
            StatusCode::OK,
            json!({ "success": false, "message": "Invalid credentials" }),
        )]);

        let err = login(&client, "ada@example.com", "wrong").await.unwrap_err();

        assert!(matches!(err, ApiError::Rejected(_)));
        assert_eq!(client.tokens().access_token(), None);
        assert_eq!(events.drain(), vec![Notice::error("Invalid credentials")]);
    }

    #[tokio::test]
    async fn login_network_failure_is_reported_once() {
        let (client, events) = client(Vec::new());

        let err = login(&client, "ada@example.com", "pw").await.unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(events.drain().len(), 1);
    }

    #[tokio::test]
    async fn logout_clears_tokens_even_when_api_fails() {
        let (client, events) = client(Vec::new());
        client.tokens().set_access_token("a1").unwrap();
        client.tokens().set_refresh_token("r1").unwrap();

        logout(&client).await;

        assert_eq!(client.tokens().access_token(), None);
        assert_eq!(client.tokens().refresh_token(), None);
        assert!(events.drain().contains(&Notice::success(LOGOUT_SUCCESS)));
    }

    #[tokio::test]
    async fn initialize_without_token_makes_no_request() {
        let (client, _) = client(Vec::new());
        assert_eq!(initialize(&client).await, None);
    }

    #[tokio::test]
    async fn initialize_clears_tokens_when_profile_is_rejected() {
        let (client, _) = client(vec![(
            "/auth/me",
            StatusCode::OK,
            json!({ "success": false }),
        )]);
        client.tokens().set_access_token("a1").unwrap();

        assert_eq!(initialize(&client).await, None);
        assert_eq!(client.tokens().access_token(), None);
    }

    #[tokio::test]
    async fn empty_verification_token_is_rejected_locally() {
        let (client, _) = client(Vec::new());
        let err = verify_email(&client, "  ").await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_VERIFICATION_LINK);
    }

    #[tokio::test]
    async fn verification_stores_returned_token() {
        let (client, events) = client(vec![(
            "/auth/verify-email",
            StatusCode::OK,
            json!({ "success": true, "data": { "token": "a2", "user": user_json() } }),
        )]);

        let user = verify_email(&client, "abc").await.unwrap();

        assert_eq!(user.map(|u| u.id).as_deref(), Some("u1"));
        assert_eq!(client.tokens().access_token().as_deref(), Some("a2"));
        assert_eq!(events.drain(), vec![Notice::success(VERIFY_SUCCESS)]);
    }

    #[tokio::test]
    async fn refresh_session_without_refresh_token_signs_out() {
        let (client, _) = client(Vec::new());
        client.tokens().set_access_token("a1").unwrap();

        assert!(!refresh_session(&client).await);
        assert_eq!(client.tokens().access_token(), None);
    }
}
