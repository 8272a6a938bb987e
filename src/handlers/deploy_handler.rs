use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::handlers::session_handler::{resolve_session, respond};
use crate::models::user_session::UserSession;
use crate::routes::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub message: String,
}

fn guided_state(user_session: &UserSession) -> HttpResponse {
    let state = user_session.guided.state();
    respond(
        user_session,
        StatusCode::OK,
        json!({ "blocks": state.blocks, "messages": state.messages }),
    )
}

pub async fn state(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let user_session = shared.lock().await;
    guided_state(&user_session)
}

pub async fn action(data: web::Data<AppState>, session: Session, form: web::Json<ActionForm>) -> HttpResponse {
    let (session_id, shared) = resolve_session(&data, &session);
    let mut guard = shared.lock().await;
    let user_session = &mut *guard;

    info!("Session {} pressed {}", session_id, form.action);
    user_session
        .guided
        .handle_action(&user_session.client, &form.action)
        .await;
    guided_state(user_session)
}

pub async fn message(data: web::Data<AppState>, session: Session, form: web::Json<MessageForm>) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let mut guard = shared.lock().await;
    let user_session = &mut *guard;

    user_session
        .guided
        .send_message(&user_session.client, &form.message)
        .await;
    guided_state(user_session)
}
