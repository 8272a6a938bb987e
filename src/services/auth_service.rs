use serde_json::json;

use crate::models::api_response::{Ack, ApiResponse};
use crate::models::user::{AuthData, LoginRequest, RefreshResponse, RegisterRequest, User};
use crate::services::api_client::{ApiClient, ApiError};

pub async fn login(client: &ApiClient, request: &LoginRequest) -> Result<ApiResponse<AuthData>, ApiError> {
    client.post("/auth/login", request).await
}

pub async fn register(
    client: &ApiClient,
    request: &RegisterRequest,
) -> Result<ApiResponse<AuthData>, ApiError> {
    client.post("/auth/register", request).await
}

pub async fn logout(client: &ApiClient) -> Result<Ack, ApiError> {
    client.post_empty("/auth/logout").await
}

pub async fn verify_email(client: &ApiClient, token: &str) -> Result<ApiResponse<AuthData>, ApiError> {
    client
        .get_with_query("/auth/verify-email", &[("token", token.to_string())])
        .await
}

pub async fn forgot_password(client: &ApiClient, email: &str) -> Result<Ack, ApiError> {
    client.post("/auth/forgot-password", &json!({ "email": email })).await
}

pub async fn reset_password(client: &ApiClient, token: &str, password: &str) -> Result<Ack, ApiError> {
    client
        .post("/auth/reset-password", &json!({ "token": token, "password": password }))
        .await
}

/// Explicit refresh through the normal request path.
pub async fn refresh_token(client: &ApiClient, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
    client
        .post("/auth/refresh-token", &json!({ "refreshToken": refresh_token }))
        .await
}

pub async fn get_profile(client: &ApiClient) -> Result<ApiResponse<User>, ApiError> {
    client.get("/auth/me").await
}
