use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::session_handler::{resolve_session, respond};
use crate::routes::app_state::AppState;
use crate::services::dashboard_service;

pub async fn overview(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let (_, shared) = resolve_session(&data, &session);
    let mut user_session = shared.lock().await;

    let overview = dashboard_service::overview(&user_session.client).await;
    user_session.sync_sign_in();
    respond(
        &user_session,
        StatusCode::OK,
        json!({ "user": user_session.user, "overview": overview }),
    )
}
