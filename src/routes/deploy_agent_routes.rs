use actix_session::Session;
use actix_web::{delete, get, post, put, web, Responder};

use crate::handlers::deploy_agent_handler::{self, ActionForm, AnalyzeForm, ApiKeyForm, MessageForm};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/deploy-agent")
            .service(initialize)
            .service(message)
            .service(action)
            .service(save_api_key)
            .service(clear_api_key)
            .service(stats)
            .service(analyze),
    );
}

#[post("/init")]
async fn initialize(data: web::Data<AppState>, session: Session) -> impl Responder {
    deploy_agent_handler::initialize(data, session).await
}

#[post("/message")]
async fn message(data: web::Data<AppState>, session: Session, form: web::Json<MessageForm>) -> impl Responder {
    deploy_agent_handler::message(data, session, form).await
}

#[post("/action")]
async fn action(data: web::Data<AppState>, session: Session, form: web::Json<ActionForm>) -> impl Responder {
    deploy_agent_handler::action(data, session, form).await
}

#[put("/api-key")]
async fn save_api_key(data: web::Data<AppState>, session: Session, form: web::Json<ApiKeyForm>) -> impl Responder {
    deploy_agent_handler::save_api_key(data, session, form).await
}

#[delete("/api-key")]
async fn clear_api_key(data: web::Data<AppState>, session: Session) -> impl Responder {
    deploy_agent_handler::clear_api_key(data, session).await
}

#[get("/stats")]
async fn stats(data: web::Data<AppState>, session: Session) -> impl Responder {
    deploy_agent_handler::stats(data, session).await
}

#[post("/analyze")]
async fn analyze(data: web::Data<AppState>, session: Session, form: web::Json<AnalyzeForm>) -> impl Responder {
    deploy_agent_handler::analyze(data, session, form).await
}
