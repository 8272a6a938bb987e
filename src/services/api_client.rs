//! HTTP client wrapper for the DoneDep API.
//!
//! Attaches the stored access token to every request, turns a 401 into one
//! refresh-and-retry, and sorts other failures into the handful of
//! categories the user gets told about.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use url::Url;

use crate::config::{LOGIN_PATH, REFRESH_TOKEN_PATH};
use crate::models::user::RefreshResponse;
use crate::notifications::{ClientEvents, Notice};
use crate::token_storage::TokenStorage;

pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found.";
pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please check your connection.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("Resource not found")]
    NotFound,

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized | ApiError::SessionExpired => Some(401),
            ApiError::NotFound => Some(404),
            ApiError::Server { status, .. } | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the client already told the user about this failure.
    pub fn is_notified(&self) -> bool {
        matches!(
            self,
            ApiError::SessionExpired
                | ApiError::NotFound
                | ApiError::Server { .. }
                | ApiError::Timeout
                | ApiError::Network(_)
        )
    }

    /// The message a person should see: the server's own message when it
    /// sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message, .. } | ApiError::Rejected(message) if !message.is_empty() => {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// The `message` field of a JSON error body, if any.
    pub fn message(&self) -> Option<String> {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("no response: {0}")]
    Network(String),
}

/// Sends one request and returns whatever came back, without interpreting
/// the status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(ReqwestTransport { client, base_url })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| TransportError::Network(format!("invalid URL {}: {}", joined, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

fn transport_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(request)?;
        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        Ok(RawResponse { status, body })
    }
}

/// Authenticated client shared by every API stub.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStorage>,
    events: Arc<dyn ClientEvents>,
    // Serializes refreshes so concurrent 401s trigger one exchange.
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: Arc<TokenStorage>,
        events: Arc<dyn ClientEvents>,
    ) -> Self {
        ApiClient {
            transport,
            tokens,
            events,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn tokens(&self) -> &TokenStorage {
        &self.tokens
    }

    pub fn events(&self) -> &dyn ClientEvents {
        self.events.as_ref()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let query = query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        self.send(ApiRequest::new(Method::GET, path).with_query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::POST, path).with_body(to_body(body)?)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::POST, path)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::PUT, path).with_body(to_body(body)?)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::PATCH, path).with_body(to_body(body)?)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute(&self, mut request: ApiRequest) -> Result<RawResponse, ApiError> {
        request.bearer = self.tokens.access_token();
        debug!("{} {}", request.method, request.path);

        let response = self.dispatch(&request).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return self.check(response);
        }

        let fresh = self.refresh_after(request.bearer.as_deref()).await?;
        request.bearer = Some(fresh);

        let retried = self.dispatch(&request).await?;
        if retried.status == StatusCode::UNAUTHORIZED {
            warn!("{} {} still unauthorized after refresh", request.method, request.path);
            return Err(ApiError::Unauthorized);
        }
        self.check(retried)
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        match self.transport.execute(request).await {
            Ok(response) => Ok(response),
            Err(TransportError::Timeout) => {
                self.events.notify(Notice::error(TIMEOUT_MESSAGE));
                Err(ApiError::Timeout)
            }
            Err(TransportError::Network(detail)) => {
                warn!("{} {} got no response: {}", request.method, request.path, detail);
                self.events.notify(Notice::error(NETWORK_MESSAGE));
                Err(ApiError::Network(detail))
            }
        }
    }

    fn check(&self, response: RawResponse) -> Result<RawResponse, ApiError> {
        let status = response.status;
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .message()
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

        if status.is_server_error() {
            self.events.notify(Notice::error(SERVER_ERROR_MESSAGE));
            Err(ApiError::Server {
                status: status.as_u16(),
                message,
            })
        } else if status == StatusCode::NOT_FOUND {
            self.events.notify(Notice::error(NOT_FOUND_MESSAGE));
            Err(ApiError::NotFound)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized)
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Returns an access token to retry with after `failed_token` was
    /// rejected. Only one caller refreshes at a time; a caller that finds
    /// the token already replaced reuses the replacement.
    async fn refresh_after(&self, failed_token: Option<&str>) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.tokens.access_token() {
            if failed_token != Some(current.as_str()) {
                debug!("Access token was refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let refresh_token = match self.tokens.refresh_token() {
            Some(token) => token,
            None => {
                info!("Got 401 with no refresh token stored");
                return Err(ApiError::Unauthorized);
            }
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok((access_token, rotated)) => {
                if let Err(e) = self.tokens.set_access_token(&access_token) {
                    warn!("Refreshed access token could not be stored: {}", e);
                }
                if let Some(rotated) = rotated {
                    if let Err(e) = self.tokens.set_refresh_token(&rotated) {
                        warn!("Rotated refresh token could not be stored: {}", e);
                    }
                }
                info!("Access token refreshed");
                Ok(access_token)
            }
            Err(reason) => {
                error!("Token refresh failed: {}", reason);
                if let Err(e) = self.tokens.clear_tokens() {
                    warn!("Failed to clear tokens after refresh failure: {}", e);
                }
                self.events.redirect(LOGIN_PATH);
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Calls the refresh endpoint directly, outside the 401 handling above.
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<(String, Option<String>), String> {
        let request = ApiRequest::new(Method::POST, REFRESH_TOKEN_PATH)
            .with_body(json!({ "refreshToken": refresh_token }));

        let response = self
            .transport
            .execute(&request)
            .await
            .map_err(|e| e.to_string())?;
        if !response.status.is_success() {
            return Err(format!("refresh endpoint returned {}", response.status));
        }

        let parsed: RefreshResponse =
            serde_json::from_str(&response.body).map_err(|e| e.to_string())?;
        if !parsed.success {
            return Err("refresh endpoint reported failure".to_string());
        }
        let access_token = parsed
            .access_token()
            .ok_or_else(|| "refresh response carried no token".to_string())?
            .to_string();
        Ok((access_token, parsed.rotated_refresh_token().map(String::from)))
    }
}

/// Percent-encodes one path segment, `/` included.
pub fn path_segment(value: &str) -> String {
    let mut url = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return value.to_string(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(value);
    }
    url.path().trim_start_matches('/').to_string()
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}
