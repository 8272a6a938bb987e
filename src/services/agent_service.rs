use crate::models::agent::{
    AgentChatData, AgentChatRequest, AgentDeploymentStatus, ProjectAnalysisData, ProjectAnalysisRequest,
};
use crate::models::api_response::ApiResponse;
use crate::services::api_client::{path_segment, ApiClient, ApiError};

pub async fn chat(client: &ApiClient, request: &AgentChatRequest) -> Result<ApiResponse<AgentChatData>, ApiError> {
    client.post("/agent/chat", request).await
}

pub async fn analyze_project(
    client: &ApiClient,
    request: &ProjectAnalysisRequest,
) -> Result<ApiResponse<ProjectAnalysisData>, ApiError> {
    client.post("/agent/analyze", request).await
}

pub async fn get_deployment_status(
    client: &ApiClient,
    deployment_id: &str,
) -> Result<ApiResponse<AgentDeploymentStatus>, ApiError> {
    client
        .get(&format!("/agent/deployment/{}/status", path_segment(deployment_id)))
        .await
}
