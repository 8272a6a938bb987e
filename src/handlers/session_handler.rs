use actix_session::Session;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::global_session_manager::SharedSession;
use crate::models::user_session::UserSession;
use crate::routes::app_state::AppState;
use crate::services::api_client::ApiError;
use crate::services::session_service;

pub const SESSION_ID_KEY: &str = "session_id";

/// Finds the console session behind the cookie, creating both the cookie
/// entry and the session when missing.
pub fn resolve_session(data: &AppState, session: &Session) -> (String, SharedSession) {
    let session_id = match session.get::<String>(SESSION_ID_KEY) {
        Ok(Some(id)) if Uuid::parse_str(&id).is_ok() => id,
        Ok(Some(id)) => {
            warn!("Ignoring malformed session_id {:?} in cookie", id);
            new_session_id(session)
        }
        Ok(None) => new_session_id(session),
        Err(e) => {
            warn!("Unreadable session cookie: {:?}", e);
            new_session_id(session)
        }
    };

    let shared = data.session_manager.get_or_insert_with(&session_id, || {
        info!("Creating console session {}", session_id);
        UserSession::persistent(&data.config, data.transport.clone(), &session_id, data.timing)
    });
    (session_id, shared)
}

fn new_session_id(session: &Session) -> String {
    let session_id = Uuid::new_v4().to_string();
    if let Err(e) = session.insert(SESSION_ID_KEY, session_id.clone()) {
        error!("Failed to insert session_id into cookie: {:?}", e);
    } else {
        info!("Stored session_id {} in cookie", session_id);
    }
    session_id
}

/// Builds the JSON reply and hands over whatever the client queued for the
/// browser. A pending forced navigation wins over `status`.
pub fn respond(user_session: &UserSession, status: StatusCode, body: Value) -> HttpResponse {
    let notices = user_session.events.drain();

    if let Some(location) = user_session.events.take_redirect() {
        return HttpResponse::Found()
            .insert_header((header::LOCATION, location.clone()))
            .json(json!({ "redirect": location, "notices": notices }));
    }

    let body = match body {
        Value::Object(mut map) => {
            map.insert("notices".to_string(), json!(notices));
            Value::Object(map)
        }
        other => json!({ "data": other, "notices": notices }),
    };
    HttpResponse::build(status).json(body)
}

pub fn respond_error(user_session: &UserSession, err: &ApiError) -> HttpResponse {
    respond(user_session, error_status(err), json!({ "error": err.to_string() }))
}

pub fn error_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Unauthorized | ApiError::SessionExpired => StatusCode::UNAUTHORIZED,
        ApiError::NotFound => StatusCode::NOT_FOUND,
        ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ApiError::Network(_) | ApiError::Server { .. } | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
        ApiError::Status { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
        }
        ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
    }
}

pub async fn initialize_session(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let (session_id, shared) = resolve_session(&data, &session);
    let mut user_session = shared.lock().await;

    if user_session.sync_sign_in().is_none() {
        let user = session_service::initialize(&user_session.client).await;
        if let Some(user) = &user {
            info!("Session {} restored for user {}", session_id, user.id);
        }
        user_session.user = user;
    }

    let body = json!({
        "initialized": true,
        "session_id": session_id,
        "authenticated": user_session.is_authenticated(),
        "user": user_session.user,
    });
    respond(&user_session, StatusCode::OK, body)
}

pub async fn check_auth(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let mut user_session = shared.lock().await;
    user_session.sync_sign_in();

    let body = json!({
        "authenticated": user_session.is_authenticated(),
        "has_valid_token": user_session.client.tokens().has_valid_token(),
        "user": user_session.user,
    });
    respond(&user_session, StatusCode::OK, body)
}
