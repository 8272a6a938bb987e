use crate::models::api_response::ApiResponse;
use crate::models::domain::{
    AvailabilityData, CheckAvailabilityRequest, ConfigureDnsData, ConfigureDnsRequest, DomainInfoData,
    RegisterDomainRequest, RegistrationData, SuggestionsData, SuggestionsRequest,
};
use crate::services::api_client::{path_segment, ApiClient, ApiError};

pub async fn check_availability(
    client: &ApiClient,
    request: &CheckAvailabilityRequest,
) -> Result<ApiResponse<AvailabilityData>, ApiError> {
    client.post("/domain/check", request).await
}

pub async fn get_suggestions(
    client: &ApiClient,
    request: &SuggestionsRequest,
) -> Result<ApiResponse<SuggestionsData>, ApiError> {
    client.post("/domain/suggestions", request).await
}

pub async fn register_domain(
    client: &ApiClient,
    request: &RegisterDomainRequest,
) -> Result<ApiResponse<RegistrationData>, ApiError> {
    client.post("/domain/register", request).await
}

pub async fn get_domain_info(client: &ApiClient, domain: &str) -> Result<ApiResponse<DomainInfoData>, ApiError> {
    client.get(&format!("/domain/info/{}", path_segment(domain))).await
}

pub async fn configure_dns(
    client: &ApiClient,
    request: &ConfigureDnsRequest,
) -> Result<ApiResponse<ConfigureDnsData>, ApiError> {
    client.post("/domain/dns", request).await
}
