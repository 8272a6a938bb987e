use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::conversation::{ActionButton, ActionVariant, ConversationMessage, Role};

/// A conversation turn in the shape `/agent/chat` expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub speaker: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionButton>,
}

impl From<&ConversationMessage> for AgentMessage {
    fn from(message: &ConversationMessage) -> Self {
        AgentMessage {
            id: message.id.clone(),
            speaker: match message.role {
                Role::User => "user".to_string(),
                Role::Assistant => "agent".to_string(),
            },
            content: message.content.clone(),
            timestamp: message.timestamp,
            actions: message.actions.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDeploymentContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RepositoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub databases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_tier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conversation_history: Vec<AgentMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_context: Option<AgentDeploymentContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAction {
    pub action: String,
    pub label: String,
    #[serde(default)]
    pub variant: String,
}

impl From<AgentAction> for ActionButton {
    fn from(action: AgentAction) -> Self {
        ActionButton {
            label: action.label,
            action: action.action,
            variant: ActionVariant::parse(&action.variant),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentChatData {
    pub response: String,
    #[serde(default)]
    pub actions: Vec<AgentAction>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysisRequest {
    pub project_type: String,
    pub technologies: Vec<String>,
    pub user_requirements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub architecture: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub databases: Vec<String>,
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalysisData {
    pub analysis: String,
    pub recommendations: Recommendations,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    pub name: String,
    pub status: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDeploymentStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub steps: Vec<AgentStep>,
    pub estimated_completion: Option<String>,
}
