use actix_session::Session;
use actix_web::{get, web, Responder};

use crate::handlers::dashboard_handler;
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(overview);
}

#[get("/dashboard")]
async fn overview(data: web::Data<AppState>, session: Session) -> impl Responder {
    dashboard_handler::overview(data, session).await
}
