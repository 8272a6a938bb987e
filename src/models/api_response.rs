use serde::{Deserialize, Serialize};

use crate::services::api_client::ApiError;

/// The `{ success, message, data }` envelope every backend endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwraps `data` from a successful envelope.
    pub fn into_data(self) -> Result<T, ApiError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| "Request was not successful".to_string()),
            )),
        }
    }
}

/// Envelope for endpoints that only report an outcome.
pub type Ack = ApiResponse<serde_json::Value>;
