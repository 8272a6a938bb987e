use log::{error, info, warn};
use serde::Serialize;

use crate::models::conversation::{ActionButton, ConversationMessage};
use crate::models::deploy_agent::{
    DeploymentAction, DeploymentRepository, DeploymentRequirements, KnowledgeStats, ProjectAnalysis,
};
use crate::notifications::Notice;
use crate::services::api_client::{ApiClient, ApiError};
use crate::services::deploy_agent_service;
use crate::token_storage::StorageError;

pub const DEFAULT_SESSION: &str = "default-session";
pub const ERROR_REPLY: &str = "Sorry, I encountered an error processing your request. Please try again.";
pub const API_KEY_SAVED: &str = "OpenAI API key saved successfully!";
pub const API_KEY_CLEARED: &str = "OpenAI API key cleared!";
pub const ANALYSIS_INCOMPLETE: &str = "Please fill in repository URL, framework, and language";
pub const ANALYSIS_SUCCESS: &str = "Project analysis completed!";
pub const ANALYSIS_FAILED: &str = "Failed to analyze project";

const SUCCESS_RATE_PERCENT: u64 = 95;
const AVERAGE_DEPLOY_TIME: &str = "12m";

const WELCOME: &str = "🚀 **DoneDep Deployment Assistant Activated**

I'm your AI-powered deployment orchestrator. I can help you with:

• **Infrastructure Planning** - Cloud architecture and resource optimization
• **CI/CD Pipeline Setup** - Automated deployment workflows
• **Container Orchestration** - Docker and Kubernetes management
• **Database Management** - Schema design and migration strategies
• **Security Implementation** - Best practices and vulnerability scanning
• **Monitoring & Observability** - Metrics, logging, and alerting setup

What deployment challenge can I help you solve today?";

/// The prompt sent on the user's behalf when an action button is pressed.
pub fn action_prompt(tag: &str) -> String {
    match tag {
        "analyze" => "Please analyze my project structure and recommend the best deployment strategy.".to_string(),
        "cicd" => "Help me set up a CI/CD pipeline for automated deployments.".to_string(),
        "deploy" => "Guide me through deploying my application to the cloud.".to_string(),
        other => format!("Execute action: {}", other),
    }
}

fn action_button(action: DeploymentAction) -> ActionButton {
    let label = action.content.filter(|c| !c.is_empty());
    let tag = action.kind.filter(|k| !k.is_empty());
    ActionButton::primary(
        label.as_deref().unwrap_or("Execute"),
        tag.as_deref().unwrap_or("execute"),
    )
}

/// Conversation with the deploy agent backend, one per console session.
#[derive(Debug, Default, Serialize)]
pub struct DeployAgentChat {
    session_id: Option<String>,
    context_id: Option<String>,
    messages: Vec<ConversationMessage>,
}

impl DeployAgentChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub async fn initialize(&mut self, client: &ApiClient) {
        match deploy_agent_service::initialize_chat(client).await {
            Ok(init) => {
                info!("Deploy agent session {} started", init.session_id);
                self.session_id = Some(init.session_id);
                if init.context_id.is_some() {
                    self.context_id = init.context_id;
                }
                self.messages = vec![ConversationMessage::assistant_with_actions(
                    WELCOME,
                    vec![
                        ActionButton::primary("Analyze Project", "analyze"),
                        ActionButton::secondary("Setup CI/CD", "cicd"),
                        ActionButton::primary("Deploy to Cloud", "deploy"),
                    ],
                )];
            }
            Err(e) => error!("Failed to initialize deploy agent chat: {}", e),
        }
    }

    pub async fn send(&mut self, client: &ApiClient, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.messages.push(ConversationMessage::user(text));

        let session_id = self.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
        let result =
            deploy_agent_service::send_message(client, text, session_id, self.context_id.as_deref()).await;

        match result {
            Ok(reply) => {
                let actions = reply.actions.into_iter().map(action_button).collect();
                self.messages
                    .push(ConversationMessage::assistant_with_actions(reply.message, actions));
                if reply.context_id.is_some() {
                    self.context_id = reply.context_id;
                }
            }
            Err(e) => {
                warn!("Failed to send message to deploy agent: {}", e);
                self.messages.push(ConversationMessage::assistant(ERROR_REPLY));
            }
        }
    }

    pub async fn handle_action(&mut self, client: &ApiClient, tag: &str) {
        let prompt = action_prompt(tag);
        self.send(client, &prompt).await;
    }
}

/// Stores the user's own assistant key. Blank input stores nothing and
/// returns `false`.
pub fn save_api_key(client: &ApiClient, key: &str) -> Result<bool, StorageError> {
    if key.trim().is_empty() {
        return Ok(false);
    }
    client.tokens().set_assistant_api_key(key)?;
    client.events().notify(Notice::success(API_KEY_SAVED));
    Ok(true)
}

pub fn clear_api_key(client: &ApiClient) -> Result<(), StorageError> {
    client.tokens().clear_assistant_api_key()?;
    client.events().notify(Notice::success(API_KEY_CLEARED));
    Ok(())
}

pub fn has_api_key(client: &ApiClient) -> bool {
    client.tokens().assistant_api_key().is_some()
}

/// Headline numbers on the deploy agent page, derived from the knowledge
/// base stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStats {
    pub total_deployments: u64,
    pub successful_deployments: u64,
    pub active_projects: u64,
    pub average_deploy_time: String,
}

impl From<&KnowledgeStats> for DeploymentStats {
    fn from(stats: &KnowledgeStats) -> Self {
        DeploymentStats {
            total_deployments: stats.total_patterns,
            successful_deployments: stats.total_patterns * SUCCESS_RATE_PERCENT / 100,
            active_projects: stats.active_sessions,
            average_deploy_time: AVERAGE_DEPLOY_TIME.to_string(),
        }
    }
}

/// Failures are logged only; the page keeps whatever it showed before.
pub async fn load_deployment_stats(client: &ApiClient) -> Option<DeploymentStats> {
    match deploy_agent_service::get_knowledge_stats(client).await {
        Ok(stats) => Some(DeploymentStats::from(&stats)),
        Err(e) => {
            error!("Failed to load deployment stats: {}", e);
            None
        }
    }
}

/// Runs a project analysis once the repository URL, framework and language
/// are all filled in.
pub async fn analyze_project(
    client: &ApiClient,
    repository: DeploymentRepository,
    requirements: DeploymentRequirements,
) -> Result<ProjectAnalysis, ApiError> {
    let incomplete = [&repository.url, &repository.framework, &repository.language]
        .iter()
        .any(|field| field.trim().is_empty());
    if incomplete {
        client.events().notify(Notice::error(ANALYSIS_INCOMPLETE));
        return Err(ApiError::Rejected(ANALYSIS_INCOMPLETE.to_string()));
    }

    match deploy_agent_service::analyze_project(client, repository, requirements).await {
        Ok(analysis) => {
            info!("Project analysis ready for context {}", analysis.context_id);
            client.events().notify(Notice::success(ANALYSIS_SUCCESS));
            Ok(analysis)
        }
        Err(e) => {
            error!("Project analysis failed: {}", e);
            if !e.is_notified() {
                client.events().notify(Notice::error(ANALYSIS_FAILED));
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_actions_map_to_prompts() {
        assert!(action_prompt("analyze").starts_with("Please analyze my project"));
        assert!(action_prompt("cicd").contains("CI/CD pipeline"));
        assert!(action_prompt("deploy").contains("deploying my application"));
        assert_eq!(action_prompt("rollback"), "Execute action: rollback");
    }

    #[test]
    fn actions_without_content_get_defaults() {
        let button = action_button(DeploymentAction {
            kind: None,
            content: None,
            language: None,
        });
        assert_eq!(button.label, "Execute");
        assert_eq!(button.action, "execute");

        let button = action_button(DeploymentAction {
            kind: Some("terraform".to_string()),
            content: Some("Apply plan".to_string()),
            language: Some("hcl".to_string()),
        });
        assert_eq!(button.label, "Apply plan");
        assert_eq!(button.action, "terraform");
    }

    #[test]
    fn stats_follow_knowledge_base_counts() {
        let knowledge = KnowledgeStats {
            total_patterns: 41,
            total_executions: 300,
            top_patterns: Vec::new(),
            category_stats: Vec::new(),
            active_sessions: 3,
        };

        let stats = DeploymentStats::from(&knowledge);

        assert_eq!(stats.total_deployments, 41);
        assert_eq!(stats.successful_deployments, 38);
        assert_eq!(stats.active_projects, 3);
        assert_eq!(stats.average_deploy_time, "12m");
    }
}
