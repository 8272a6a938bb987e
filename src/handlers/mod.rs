pub mod auth_handler;
pub mod dashboard_handler;
pub mod deploy_agent_handler;
pub mod deploy_handler;
pub mod session_handler;
