use actix_session::Session;
use actix_web::{get, post, web, Responder};

use crate::handlers::auth_handler::{self, LoginForm, RegisterForm, VerifyQuery};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(login)
            .service(register)
            .service(logout)
            .service(verify_email),
    );
}

#[post("/login")]
async fn login(data: web::Data<AppState>, session: Session, form: web::Json<LoginForm>) -> impl Responder {
    auth_handler::login(data, session, form).await
}

#[post("/register")]
async fn register(data: web::Data<AppState>, session: Session, form: web::Json<RegisterForm>) -> impl Responder {
    auth_handler::register(data, session, form).await
}

#[post("/logout")]
async fn logout(data: web::Data<AppState>, session: Session) -> impl Responder {
    auth_handler::logout(data, session).await
}

#[get("/verify-email")]
async fn verify_email(data: web::Data<AppState>, session: Session, query: web::Query<VerifyQuery>) -> impl Responder {
    auth_handler::verify_email(data, session, query).await
}
