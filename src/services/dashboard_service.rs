use log::warn;
use serde::Serialize;

use crate::models::deploy_agent::{DeploymentContext, DeploymentState};
use crate::services::api_client::{ApiClient, ApiError};
use crate::services::{deploy_agent_service, domain_reseller_service, native_email_service, stripe_connect_service};

const RECENT_DEPLOYMENTS: u32 = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDeployment {
    pub id: String,
    pub repository: String,
    pub status: DeploymentState,
    pub updated_at: String,
}

impl From<&DeploymentContext> for RecentDeployment {
    fn from(context: &DeploymentContext) -> Self {
        RecentDeployment {
            id: context.id.clone(),
            repository: context.repository.url.clone(),
            status: context.status,
            updated_at: context.updated_at.clone(),
        }
    }
}

/// Counts shown on the dashboard. A count is `None` when its source could
/// not be read; the others are still filled in.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_deployments: Option<u64>,
    pub active_domains: Option<usize>,
    pub email_services: Option<usize>,
    pub payment_accounts: Option<usize>,
    pub recent_deployments: Vec<RecentDeployment>,
}

pub async fn overview(client: &ApiClient) -> DashboardOverview {
    let (deployments, domains, email, payments) = tokio::join!(
        deploy_agent_service::get_deployments(client, 1, RECENT_DEPLOYMENTS),
        domain_reseller_service::get_user_domains(client),
        native_email_service::get_email_services(client),
        stripe_connect_service::get_accounts(client),
    );

    let mut overview = DashboardOverview::default();
    if let Some(page) = source("deployments", deployments) {
        overview.total_deployments = Some(page.pagination.total);
        overview.recent_deployments = page.deployments.iter().map(RecentDeployment::from).collect();
    }
    overview.active_domains = source("domains", domains.and_then(|r| r.into_data())).map(|d| d.len());
    overview.email_services = source("email services", email.and_then(|r| r.into_data())).map(|s| s.len());
    overview.payment_accounts =
        source("payment accounts", payments.and_then(|r| r.into_data())).map(|a| a.len());
    overview
}

fn source<T>(name: &str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Dashboard could not load {}: {}", name, e);
            None
        }
    }
}
