use serde_json::{json, Value};

use crate::models::api_response::{Ack, ApiResponse};
use crate::models::domain_reseller::{
    DomainRegistrationData, DomainSearchResult, ResellerDnsRecord, ResellerDomainInfo,
};
use crate::services::api_client::{path_segment, ApiClient, ApiError};

fn domain_path(domain: &str, action: &str) -> String {
    format!("/domain-reseller/{}/{}", path_segment(domain), action)
}

pub async fn search_domains(
    client: &ApiClient,
    query: &str,
    tlds: Option<&[String]>,
) -> Result<ApiResponse<Vec<DomainSearchResult>>, ApiError> {
    client
        .post("/domain-reseller/search", &json!({ "query": query, "tlds": tlds }))
        .await
}

/// `tlds` go out as one comma-separated query parameter.
pub async fn get_pricing(client: &ApiClient, tlds: Option<&[String]>) -> Result<ApiResponse<Value>, ApiError> {
    match tlds {
        Some(tlds) => {
            client
                .get_with_query("/domain-reseller/pricing", &[("tlds", tlds.join(","))])
                .await
        }
        None => client.get("/domain-reseller/pricing").await,
    }
}

pub async fn register_domain(client: &ApiClient, data: &DomainRegistrationData) -> Result<Ack, ApiError> {
    client.post("/domain-reseller/register", data).await
}

pub async fn get_user_domains(client: &ApiClient) -> Result<ApiResponse<Vec<ResellerDomainInfo>>, ApiError> {
    client.get("/domain-reseller/user-domains").await
}

pub async fn get_domain_info(client: &ApiClient, domain: &str) -> Result<ApiResponse<ResellerDomainInfo>, ApiError> {
    client.get(&domain_path(domain, "info")).await
}

pub async fn set_nameservers(client: &ApiClient, domain: &str, nameservers: &[String]) -> Result<Ack, ApiError> {
    client
        .put(&domain_path(domain, "nameservers"), &json!({ "nameservers": nameservers }))
        .await
}

pub async fn get_dns_records(
    client: &ApiClient,
    domain: &str,
) -> Result<ApiResponse<Vec<ResellerDnsRecord>>, ApiError> {
    client.get(&domain_path(domain, "dns")).await
}

pub async fn set_dns_records(client: &ApiClient, domain: &str, records: &[ResellerDnsRecord]) -> Result<Ack, ApiError> {
    client.put(&domain_path(domain, "dns"), &json!({ "records": records })).await
}

pub async fn renew_domain(client: &ApiClient, domain: &str, years: u32) -> Result<Ack, ApiError> {
    client.post(&domain_path(domain, "renew"), &json!({ "years": years })).await
}

pub async fn set_whois_privacy(client: &ApiClient, domain: &str, enabled: bool) -> Result<Ack, ApiError> {
    client
        .put(&domain_path(domain, "whois-privacy"), &json!({ "enabled": enabled }))
        .await
}
