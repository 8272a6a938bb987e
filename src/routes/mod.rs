pub mod app_state;
pub mod auth_routes;
pub mod dashboard_routes;
pub mod deploy_agent_routes;
pub mod deploy_routes;
pub mod session_routes;
