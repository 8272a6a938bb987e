use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};

use DoneDepConsole::config::{self, AppConfig};
use DoneDepConsole::routes::app_state::AppState;
use DoneDepConsole::routes::{auth_routes, dashboard_routes, deploy_agent_routes, deploy_routes, session_routes};
use DoneDepConsole::services::api_client::ReqwestTransport;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    config::init_logging();

    let app_config = AppConfig::from_env()?;
    let transport = ReqwestTransport::new(app_config.api_base_url.clone(), app_config.request_timeout)
        .context("Failed to build HTTP client")?;

    let secret_key = match &app_config.session_key {
        Some(key) => Key::try_from(key.as_bytes()).context("Invalid session key")?,
        None => {
            warn!("DONEDEP_SESSION_KEY not set, sessions will not survive a restart");
            Key::generate()
        }
    };
    let cookie_secure = app_config.production;
    let bind_addr = app_config.bind_addr.clone();

    info!("API base URL: {}", app_config.api_base_url);
    let state = web::Data::new(AppState::new(app_config, Arc::new(transport)));

    info!("Starting server on http://{}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(cookie_secure)
                    .build(),
            )
            .app_data(state.clone())
            .configure(session_routes::init_routes)
            .configure(auth_routes::init_routes)
            .configure(deploy_routes::init_routes)
            .configure(deploy_agent_routes::init_routes)
            .configure(dashboard_routes::init_routes)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
