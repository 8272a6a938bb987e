mod common;

use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::{header, StatusCode as HttpStatus};
use actix_web::{test, web, App};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use common::ScriptedTransport;
use DoneDepConsole::config::AppConfig;
use DoneDepConsole::models::user_session::token_file;
use DoneDepConsole::routes::app_state::AppState;
use DoneDepConsole::routes::{auth_routes, dashboard_routes, deploy_agent_routes, deploy_routes, session_routes};
use DoneDepConsole::services::guided_deployment::ScriptTiming;

fn app_state(transport: Arc<ScriptedTransport>) -> web::Data<AppState> {
    let config = AppConfig {
        token_dir: std::env::temp_dir()
            .join("donedep-route-tests")
            .join(Uuid::new_v4().to_string()),
        ..AppConfig::default()
    };
    web::Data::new(AppState::new(config, transport).with_timing(ScriptTiming::instant()))
}

macro_rules! console_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data($state.clone())
                .configure(session_routes::init_routes)
                .configure(auth_routes::init_routes)
                .configure(deploy_routes::init_routes)
                .configure(deploy_agent_routes::init_routes)
                .configure(dashboard_routes::init_routes),
        )
        .await
    };
}

fn login_reply() -> Value {
    json!({
        "success": true,
        "data": {
            "token": "a1",
            "refreshToken": "r1",
            "user": { "id": "u1", "email": "ada@example.com", "name": "Ada", "isEmailVerified": true }
        }
    })
}

#[actix_web::test]
async fn init_session_sets_cookie_for_anonymous_visitor() {
    let state = app_state(ScriptedTransport::new());
    let app = console_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/init_session").to_request()).await;

    assert_eq!(resp.status(), HttpStatus::OK);
    assert!(resp.response().cookies().next().is_some());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["initialized"], true);
    assert_eq!(body["authenticated"], false);
    assert_eq!(state.session_manager.len(), 1);
}

#[actix_web::test]
async fn login_then_check_auth_uses_the_same_session() {
    let transport = ScriptedTransport::new();
    transport.reply(Method::POST, "/auth/login", StatusCode::OK, login_reply());
    let state = app_state(transport);
    let app = console_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "pw" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), HttpStatus::OK);
    let cookie: Cookie<'static> = resp.response().cookies().next().unwrap().into_owned();
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["notices"][0]["message"], "Login successful!");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/check_auth").cookie(cookie).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(state.session_manager.len(), 1);
}

#[actix_web::test]
async fn failed_login_maps_to_bad_request() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/auth/login",
        StatusCode::OK,
        json!({ "success": false, "message": "Invalid credentials" }),
    );
    let state = app_state(transport);
    let app = console_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "nope" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), HttpStatus::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[actix_web::test]
async fn verify_email_without_token_is_rejected() {
    let state = app_state(ScriptedTransport::new());
    let app = console_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/auth/verify-email").to_request()).await;

    assert_eq!(resp.status(), HttpStatus::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["verified"], false);
}

#[actix_web::test]
async fn deploy_action_returns_updated_board() {
    let state = app_state(ScriptedTransport::new());
    let app = console_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/deploy/action")
            .set_json(json!({ "action": "connect_github" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), HttpStatus::OK);
    let body: Value = test::read_body_json(resp).await;
    let frontend = body["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == "frontend")
        .unwrap()
        .clone();
    assert_eq!(frontend["status"], "connected");
    assert_eq!(body["messages"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn expired_session_redirects_to_login() {
    let transport = ScriptedTransport::new();
    transport.reply(Method::POST, "/auth/login", StatusCode::OK, login_reply());
    transport.reply(Method::POST, "/deployagent/chat/init", StatusCode::UNAUTHORIZED, json!({}));
    transport.reply(Method::POST, "/auth/refresh-token", StatusCode::UNAUTHORIZED, json!({}));
    let state = app_state(transport);
    let app = console_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "pw" }))
            .to_request(),
    )
    .await;
    let cookie: Cookie<'static> = resp.response().cookies().next().unwrap().into_owned();

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/deploy-agent/init").cookie(cookie.clone()).to_request(),
    )
    .await;

    assert_eq!(resp.status(), HttpStatus::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/check_auth").cookie(cookie.clone()).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["has_valid_token"], false);
    assert!(body["user"].is_null());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/init_session").cookie(cookie).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);
    assert!(body["user"].is_null());
}

#[actix_web::test]
async fn logout_drops_the_session_and_its_token_file() {
    let transport = ScriptedTransport::new();
    transport.reply(Method::POST, "/auth/login", StatusCode::OK, login_reply());
    transport.reply(Method::POST, "/auth/logout", StatusCode::OK, json!({ "success": true }));
    let state = app_state(transport);
    let app = console_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "pw" }))
            .to_request(),
    )
    .await;
    let cookie: Cookie<'static> = resp.response().cookies().next().unwrap().into_owned();

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/init_session").cookie(cookie.clone()).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    let token_file = token_file(&state.config.token_dir, &session_id);
    assert!(token_file.exists());

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/auth/logout").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), HttpStatus::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["redirect"], "/");
    assert_eq!(body["notices"][0]["message"], "Logged out successfully");

    assert!(!token_file.exists());
    assert!(state.session_manager.is_empty());
}

#[actix_web::test]
async fn anonymous_logouts_do_not_pile_up_sessions() {
    let state = app_state(ScriptedTransport::new());
    let app = console_app!(state);

    for _ in 0..50 {
        let resp = test::call_service(&app, test::TestRequest::get().uri("/check_auth").to_request()).await;
        let cookie: Cookie<'static> = resp.response().cookies().next().unwrap().into_owned();
        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/auth/logout").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(resp.status(), HttpStatus::OK);
    }

    assert!(state.session_manager.is_empty());
}

#[actix_web::test]
async fn api_key_can_be_saved_and_cleared() {
    let state = app_state(ScriptedTransport::new());
    let app = console_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/deploy-agent/api-key")
            .set_json(json!({ "key": "sk-test" }))
            .to_request(),
    )
    .await;
    let cookie: Cookie<'static> = resp.response().cookies().next().unwrap().into_owned();
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["has_api_key"], true);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete().uri("/deploy-agent/api-key").cookie(cookie).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["has_api_key"], false);
}

#[actix_web::test]
async fn dashboard_reports_unreachable_sources_as_null() {
    let state = app_state(ScriptedTransport::new());
    let app = console_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/dashboard").to_request()).await;

    assert_eq!(resp.status(), HttpStatus::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["overview"]["totalDeployments"].is_null());
    assert!(body["overview"]["recentDeployments"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn analyze_requires_repository_details() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::GET,
        "/deployagent/knowledge/stats",
        StatusCode::OK,
        json!({ "success": true, "data": { "totalPatterns": 100, "totalExecutions": 5 } }),
    );
    let state = app_state(transport.clone());
    let app = console_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/deploy-agent/analyze")
            .set_json(json!({ "url": "https://github.com/ada/shop", "framework": "nextjs" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), HttpStatus::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["notices"][0]["message"], "Please fill in repository URL, framework, and language");
    assert!(transport.requests().is_empty());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/deploy-agent/stats").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["stats"]["totalDeployments"], 100);
    assert_eq!(body["stats"]["successfulDeployments"], 95);
    assert_eq!(body["stats"]["activeProjects"], 0);
}
