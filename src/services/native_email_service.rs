use serde_json::{json, Value};

use crate::models::api_response::{Ack, ApiResponse};
use crate::models::native_email::{
    DomainSetupData, EmailAnalytics, EmailCampaign, EmailService, EmailTemplate, EmailTemplateUpdate,
    NewEmailCampaign, NewEmailTemplate, SendEmailData,
};
use crate::services::api_client::{path_segment, ApiClient, ApiError};

pub async fn setup_domain(client: &ApiClient, data: &DomainSetupData) -> Result<ApiResponse<EmailService>, ApiError> {
    client.post("/native-email/setup-domain", data).await
}

pub async fn get_email_services(client: &ApiClient) -> Result<ApiResponse<Vec<EmailService>>, ApiError> {
    client.get("/native-email/services").await
}

pub async fn send_email(client: &ApiClient, data: &SendEmailData) -> Result<Ack, ApiError> {
    client.post("/native-email/send", data).await
}

pub async fn get_templates(client: &ApiClient) -> Result<ApiResponse<Vec<EmailTemplate>>, ApiError> {
    client.get("/native-email/templates").await
}

pub async fn create_template(
    client: &ApiClient,
    template: &NewEmailTemplate,
) -> Result<ApiResponse<EmailTemplate>, ApiError> {
    client.post("/native-email/templates", template).await
}

pub async fn update_template(
    client: &ApiClient,
    id: &str,
    update: &EmailTemplateUpdate,
) -> Result<ApiResponse<EmailTemplate>, ApiError> {
    client
        .put(&format!("/native-email/templates/{}", path_segment(id)), update)
        .await
}

pub async fn delete_template(client: &ApiClient, id: &str) -> Result<Ack, ApiError> {
    client
        .delete(&format!("/native-email/templates/{}", path_segment(id)))
        .await
}

pub async fn get_campaigns(client: &ApiClient) -> Result<ApiResponse<Vec<EmailCampaign>>, ApiError> {
    client.get("/native-email/campaigns").await
}

pub async fn create_campaign(
    client: &ApiClient,
    campaign: &NewEmailCampaign,
) -> Result<ApiResponse<EmailCampaign>, ApiError> {
    client.post("/native-email/campaigns", campaign).await
}

pub async fn start_campaign(client: &ApiClient, id: &str) -> Result<Ack, ApiError> {
    client
        .post_empty(&format!("/native-email/campaigns/{}/start", path_segment(id)))
        .await
}

pub async fn pause_campaign(client: &ApiClient, id: &str) -> Result<Ack, ApiError> {
    client
        .post_empty(&format!("/native-email/campaigns/{}/pause", path_segment(id)))
        .await
}

pub async fn get_analytics(
    client: &ApiClient,
    service_id: Option<&str>,
    period: Option<&str>,
) -> Result<ApiResponse<EmailAnalytics>, ApiError> {
    let mut query = Vec::new();
    if let Some(service_id) = service_id {
        query.push(("serviceId", service_id.to_string()));
    }
    if let Some(period) = period {
        query.push(("period", period.to_string()));
    }
    client.get_with_query("/native-email/analytics", &query).await
}

pub async fn get_dns_records(client: &ApiClient, domain: &str) -> Result<ApiResponse<Value>, ApiError> {
    client
        .get(&format!("/native-email/dns-records/{}", path_segment(domain)))
        .await
}

pub async fn verify_domain(client: &ApiClient, domain: &str) -> Result<ApiResponse<Value>, ApiError> {
    client
        .post_empty(&format!("/native-email/verify-domain/{}", path_segment(domain)))
        .await
}

pub async fn unsubscribe(client: &ApiClient, token: &str) -> Result<Ack, ApiError> {
    client.post("/native-email/unsubscribe", &json!({ "token": token })).await
}

pub async fn get_suppression_list(client: &ApiClient) -> Result<ApiResponse<Vec<Value>>, ApiError> {
    client.get("/native-email/suppression-list").await
}

pub async fn add_to_suppression_list(client: &ApiClient, email: &str, reason: &str) -> Result<Ack, ApiError> {
    client
        .post("/native-email/suppression-list", &json!({ "email": email, "reason": reason }))
        .await
}

pub async fn remove_from_suppression_list(client: &ApiClient, email: &str) -> Result<Ack, ApiError> {
    client
        .delete(&format!("/native-email/suppression-list/{}", path_segment(email)))
        .await
}
