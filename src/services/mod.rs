pub mod agent_service;
pub mod api_client;
pub mod auth_service;
pub mod dashboard_service;
pub mod deploy_agent_chat;
pub mod deploy_agent_service;
pub mod domain_reseller_service;
pub mod domain_service;
pub mod github_service;
pub mod guided_deployment;
pub mod infrastructure_service;
pub mod native_email_service;
pub mod session_service;
pub mod stripe_connect_service;
