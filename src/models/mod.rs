pub mod agent;
pub mod api_response;
pub mod conversation;
pub mod deploy_agent;
pub mod deployment_block;
pub mod domain;
pub mod domain_reseller;
pub mod github;
pub mod infrastructure;
pub mod native_email;
pub mod stripe_connect;
pub mod user;
pub mod user_session;
