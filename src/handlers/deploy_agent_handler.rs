use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::handlers::session_handler::{resolve_session, respond, respond_error};
use crate::models::deploy_agent::{DeploymentRepository, DeploymentRequirements};
use crate::models::user_session::UserSession;
use crate::routes::app_state::AppState;
use crate::services::deploy_agent_chat;

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyForm {
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzeForm {
    pub url: String,
    pub branch: String,
    pub framework: String,
    pub language: String,
    pub package_manager: Option<String>,
    pub requirements: DeploymentRequirements,
}

impl AnalyzeForm {
    fn into_parts(self) -> (DeploymentRepository, DeploymentRequirements) {
        let branch = if self.branch.trim().is_empty() { "main".to_string() } else { self.branch };
        let repository = DeploymentRepository {
            url: self.url,
            branch,
            framework: self.framework,
            language: self.language,
            package_manager: self.package_manager.filter(|p| !p.is_empty()),
        };
        (repository, self.requirements)
    }
}

fn chat_state(user_session: &UserSession) -> HttpResponse {
    let chat = &user_session.deploy_agent;
    respond(
        user_session,
        StatusCode::OK,
        json!({
            "session_id": chat.session_id(),
            "context_id": chat.context_id(),
            "messages": chat.messages(),
            "has_api_key": deploy_agent_chat::has_api_key(&user_session.client),
        }),
    )
}

pub async fn initialize(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let mut guard = shared.lock().await;
    let user_session = &mut *guard;

    if user_session.deploy_agent.session_id().is_none() {
        user_session.deploy_agent.initialize(&user_session.client).await;
    }
    chat_state(user_session)
}

pub async fn message(data: web::Data<AppState>, session: Session, form: web::Json<MessageForm>) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let mut guard = shared.lock().await;
    let user_session = &mut *guard;

    user_session
        .deploy_agent
        .send(&user_session.client, &form.message)
        .await;
    chat_state(user_session)
}

pub async fn action(data: web::Data<AppState>, session: Session, form: web::Json<ActionForm>) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let mut guard = shared.lock().await;
    let user_session = &mut *guard;

    user_session
        .deploy_agent
        .handle_action(&user_session.client, &form.action)
        .await;
    chat_state(user_session)
}

pub async fn save_api_key(data: web::Data<AppState>, session: Session, form: web::Json<ApiKeyForm>) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let user_session = shared.lock().await;

    match deploy_agent_chat::save_api_key(&user_session.client, &form.key) {
        Ok(true) => chat_state(&user_session),
        Ok(false) => respond(&user_session, StatusCode::BAD_REQUEST, json!({ "error": "API key is empty" })),
        Err(e) => {
            error!("Failed to store assistant API key: {}", e);
            respond(
                &user_session,
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "API key could not be stored" }),
            )
        }
    }
}

pub async fn clear_api_key(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let user_session = shared.lock().await;

    match deploy_agent_chat::clear_api_key(&user_session.client) {
        Ok(()) => chat_state(&user_session),
        Err(e) => {
            error!("Failed to clear assistant API key: {}", e);
            respond(
                &user_session,
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "API key could not be cleared" }),
            )
        }
    }
}

pub async fn stats(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let user_session = shared.lock().await;

    let stats = deploy_agent_chat::load_deployment_stats(&user_session.client).await;
    respond(&user_session, StatusCode::OK, json!({ "stats": stats }))
}

pub async fn analyze(data: web::Data<AppState>, session: Session, form: web::Json<AnalyzeForm>) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let user_session = shared.lock().await;
    let (repository, requirements) = form.into_inner().into_parts();

    match deploy_agent_chat::analyze_project(&user_session.client, repository, requirements).await {
        Ok(analysis) => respond(&user_session, StatusCode::OK, json!({ "analysis": analysis })),
        Err(e) => respond_error(&user_session, &e),
    }
}
