//! `/deployagent` endpoints. Unlike the other stubs these hand back the
//! `data` payload directly and turn an unsuccessful envelope into an error.

use crate::models::api_response::{Ack, ApiResponse};
use crate::models::deploy_agent::{
    AnalyzeRequest, ChatHistory, ChatInit, DeployAgentReply, DeploymentPage, DeploymentRepository,
    DeploymentRequirements, DeploymentStatusReport, FeedbackRequest, KnowledgeStats, ProjectAnalysis,
    SendMessageRequest,
};
use crate::services::api_client::{path_segment, ApiClient, ApiError};

pub async fn initialize_chat(client: &ApiClient) -> Result<ChatInit, ApiError> {
    let response: ApiResponse<ChatInit> = client.post_empty("/deployagent/chat/init").await?;
    response.into_data()
}

pub async fn send_message(
    client: &ApiClient,
    message: &str,
    session_id: &str,
    context_id: Option<&str>,
) -> Result<DeployAgentReply, ApiError> {
    let request = SendMessageRequest {
        message: message.to_string(),
        session_id: session_id.to_string(),
        context_id: context_id.map(String::from),
    };
    let response: ApiResponse<DeployAgentReply> = client.post("/deployagent/chat/message", &request).await?;
    response.into_data()
}

pub async fn get_chat_history(client: &ApiClient, session_id: &str) -> Result<ChatHistory, ApiError> {
    let response: ApiResponse<ChatHistory> = client
        .get(&format!("/deployagent/chat/{}/history", path_segment(session_id)))
        .await?;
    response.into_data()
}

pub async fn analyze_project(
    client: &ApiClient,
    repository: DeploymentRepository,
    requirements: DeploymentRequirements,
) -> Result<ProjectAnalysis, ApiError> {
    let request = AnalyzeRequest {
        repository,
        requirements,
    };
    let response: ApiResponse<ProjectAnalysis> = client.post("/deployagent/analyze", &request).await?;
    response.into_data()
}

pub async fn get_deployments(client: &ApiClient, page: u32, limit: u32) -> Result<DeploymentPage, ApiError> {
    let response: ApiResponse<DeploymentPage> = client
        .get_with_query(
            "/deployagent/deployments",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await?;
    response.into_data()
}

pub async fn get_deployment_status(client: &ApiClient, context_id: &str) -> Result<DeploymentStatusReport, ApiError> {
    let response: ApiResponse<DeploymentStatusReport> = client
        .get(&format!("/deployagent/deployments/{}/status", path_segment(context_id)))
        .await?;
    response.into_data()
}

/// Returns the server's acknowledgement message.
pub async fn submit_feedback(
    client: &ApiClient,
    context_id: &str,
    rating: u8,
    comment: Option<&str>,
) -> Result<String, ApiError> {
    let request = FeedbackRequest {
        rating,
        comment: comment.map(String::from),
    };
    let response: Ack = client
        .post(
            &format!("/deployagent/deployments/{}/feedback", path_segment(context_id)),
            &request,
        )
        .await?;
    acknowledged(response)
}

pub async fn get_knowledge_stats(client: &ApiClient) -> Result<KnowledgeStats, ApiError> {
    let response: ApiResponse<KnowledgeStats> = client.get("/deployagent/knowledge/stats").await?;
    response.into_data()
}

pub async fn seed_knowledge_base(client: &ApiClient) -> Result<String, ApiError> {
    let response: Ack = client.post_empty("/deployagent/knowledge/seed").await?;
    acknowledged(response)
}

fn acknowledged(response: Ack) -> Result<String, ApiError> {
    if response.success {
        Ok(response.message.unwrap_or_default())
    } else {
        Err(ApiError::Rejected(response.message.unwrap_or_default()))
    }
}
