use actix_session::Session;
use actix_web::{get, web, Responder};

use crate::handlers::session_handler;
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(init_session).service(check_auth);
}

#[get("/init_session")]
async fn init_session(data: web::Data<AppState>, session: Session) -> impl Responder {
    session_handler::initialize_session(data, session).await
}

#[get("/check_auth")]
async fn check_auth(data: web::Data<AppState>, session: Session) -> impl Responder {
    session_handler::check_auth(data, session).await
}
