use actix_session::Session;
use actix_web::{get, post, web, Responder};

use crate::handlers::deploy_handler::{self, ActionForm, MessageForm};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/deploy")
            .service(state)
            .service(action)
            .service(message),
    );
}

#[get("/state")]
async fn state(data: web::Data<AppState>, session: Session) -> impl Responder {
    deploy_handler::state(data, session).await
}

#[post("/action")]
async fn action(data: web::Data<AppState>, session: Session, form: web::Json<ActionForm>) -> impl Responder {
    deploy_handler::action(data, session, form).await
}

#[post("/message")]
async fn message(data: web::Data<AppState>, session: Session, form: web::Json<MessageForm>) -> impl Responder {
    deploy_handler::message(data, session, form).await
}
