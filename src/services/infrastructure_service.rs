use crate::models::api_response::ApiResponse;
use crate::models::infrastructure::{
    AppStatusData, CreateAppData, CreateAppRequest, CreateDatabaseData, CreateDatabaseRequest, RegionsData,
    ScaleAppData, ScaleAppRequest,
};
use crate::services::api_client::{path_segment, ApiClient, ApiError};

pub async fn create_app(client: &ApiClient, request: &CreateAppRequest) -> Result<ApiResponse<CreateAppData>, ApiError> {
    client.post("/infrastructure/app", request).await
}

pub async fn get_app_status(client: &ApiClient, app_id: &str) -> Result<ApiResponse<AppStatusData>, ApiError> {
    client
        .get(&format!("/infrastructure/app/{}/status", path_segment(app_id)))
        .await
}

pub async fn scale_app(
    client: &ApiClient,
    app_id: &str,
    request: &ScaleAppRequest,
) -> Result<ApiResponse<ScaleAppData>, ApiError> {
    client
        .put(&format!("/infrastructure/app/{}/scale", path_segment(app_id)), request)
        .await
}

pub async fn create_database(
    client: &ApiClient,
    request: &CreateDatabaseRequest,
) -> Result<ApiResponse<CreateDatabaseData>, ApiError> {
    client.post("/infrastructure/database", request).await
}

pub async fn get_regions(client: &ApiClient) -> Result<ApiResponse<RegionsData>, ApiError> {
    client.get("/infrastructure/regions").await
}
