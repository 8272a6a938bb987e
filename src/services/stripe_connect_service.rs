use serde_json::Value;

use crate::models::api_response::ApiResponse;
use crate::models::stripe_connect::{
    CheckoutSessionData, CreateAccountData, LinkData, PaymentAccount, PaymentAnalytics, PaymentIntentData,
};
use crate::services::api_client::{path_segment, ApiClient, ApiError};

fn account_path(account_id: &str, action: &str) -> String {
    format!("/stripe-connect/account/{}/{}", path_segment(account_id), action)
}

pub async fn create_account(
    client: &ApiClient,
    data: &CreateAccountData,
) -> Result<ApiResponse<PaymentAccount>, ApiError> {
    client.post("/stripe-connect/create-account", data).await
}

pub async fn get_accounts(client: &ApiClient) -> Result<ApiResponse<Vec<PaymentAccount>>, ApiError> {
    client.get("/stripe-connect/accounts").await
}

pub async fn get_account_status(client: &ApiClient, account_id: &str) -> Result<ApiResponse<Value>, ApiError> {
    client.get(&account_path(account_id, "status")).await
}

pub async fn create_onboarding_link(client: &ApiClient, account_id: &str) -> Result<ApiResponse<LinkData>, ApiError> {
    client.post_empty(&account_path(account_id, "onboard")).await
}

pub async fn get_dashboard_link(client: &ApiClient, account_id: &str) -> Result<ApiResponse<LinkData>, ApiError> {
    client.get(&account_path(account_id, "dashboard")).await
}

pub async fn create_payment_intent(
    client: &ApiClient,
    data: &PaymentIntentData,
) -> Result<ApiResponse<Value>, ApiError> {
    client.post("/stripe-connect/payment-intent", data).await
}

pub async fn create_checkout_session(
    client: &ApiClient,
    data: &CheckoutSessionData,
) -> Result<ApiResponse<LinkData>, ApiError> {
    client.post("/stripe-connect/checkout-session", data).await
}

pub async fn get_analytics(
    client: &ApiClient,
    account_id: &str,
    period: Option<&str>,
) -> Result<ApiResponse<PaymentAnalytics>, ApiError> {
    let path = account_path(account_id, "analytics");
    match period {
        Some(period) => client.get_with_query(&path, &[("period", period.to_string())]).await,
        None => client.get(&path).await,
    }
}

pub async fn get_supported_countries(client: &ApiClient) -> Result<ApiResponse<Vec<String>>, ApiError> {
    client.get("/stripe-connect/supported-countries").await
}

pub async fn get_platform_fees(client: &ApiClient) -> Result<ApiResponse<Value>, ApiError> {
    client.get("/stripe-connect/platform-fees").await
}
