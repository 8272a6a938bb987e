use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::handlers::session_handler::{resolve_session, respond, respond_error};
use crate::models::user_session::remove_token_file;
use crate::routes::app_state::AppState;
use crate::services::session_service;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

pub async fn login(data: web::Data<AppState>, session: Session, form: web::Json<LoginForm>) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let mut user_session = shared.lock().await;

    match session_service::login(&user_session.client, &form.email, &form.password).await {
        Ok(user) => {
            user_session.user = Some(user);
            let body = json!({ "user": user_session.user, "redirect": "/dashboard" });
            respond(&user_session, StatusCode::OK, body)
        }
        Err(e) => respond_error(&user_session, &e),
    }
}

pub async fn register(data: web::Data<AppState>, session: Session, form: web::Json<RegisterForm>) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let user_session = shared.lock().await;

    match session_service::register(&user_session.client, &form.email, &form.password, &form.name).await {
        Ok(()) => {
            let body = json!({
                "registered": true,
                "redirect": "/login?message=Please check your email to verify your account",
            });
            respond(&user_session, StatusCode::OK, body)
        }
        Err(e) => respond_error(&user_session, &e),
    }
}

pub async fn logout(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let (session_id, shared) = resolve_session(&data, &session);
    let response = {
        let mut user_session = shared.lock().await;
        session_service::logout(&user_session.client).await;
        user_session.user = None;
        respond(&user_session, StatusCode::OK, json!({ "redirect": "/" }))
    };

    data.session_manager.remove(&session_id);
    remove_token_file(&data.config.token_dir, &session_id);
    session.purge();
    response
}

pub async fn verify_email(data: web::Data<AppState>, session: Session, query: web::Query<VerifyQuery>) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let mut user_session = shared.lock().await;
    let token = query.token.as_deref().unwrap_or_default();

    match session_service::verify_email(&user_session.client, token).await {
        Ok(user) => {
            if user.is_some() {
                user_session.user = user;
            }
            let body = json!({ "verified": true, "redirect": "/dashboard" });
            respond(&user_session, StatusCode::OK, body)
        }
        Err(e) => respond(&user_session, StatusCode::BAD_REQUEST, json!({ "verified": false, "error": e.to_string() })),
    }
}
