use crate::models::api_response::ApiResponse;
use crate::models::github::{AnalyzeData, ConnectData, ConnectRequest, DeploymentStatusData, RepositoryRequest};
use crate::services::api_client::{ApiClient, ApiError};

pub async fn connect(client: &ApiClient, access_token: &str) -> Result<ApiResponse<ConnectData>, ApiError> {
    let request = ConnectRequest {
        access_token: access_token.to_string(),
    };
    client.post("/github/connect", &request).await
}

pub async fn analyze_repository(
    client: &ApiClient,
    request: &RepositoryRequest,
) -> Result<ApiResponse<AnalyzeData>, ApiError> {
    client.post("/github/analyze", request).await
}

pub async fn get_deployment_status(
    client: &ApiClient,
    request: &RepositoryRequest,
) -> Result<ApiResponse<DeploymentStatusData>, ApiError> {
    client.post("/github/deployment-status", request).await
}
