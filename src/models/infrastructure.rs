use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubSource {
    pub repo: String,
    pub branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRoute {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppService {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_size_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<ServiceRoute>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Postgresql,
    Mysql,
    Mongodb,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDatabase {
    pub name: String,
    pub engine: DatabaseEngine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_nodes: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<AppService>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub databases: Option<Vec<AppDatabase>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_vars: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployedService {
    #[serde(flatten)]
    pub service: AppService,
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedDatabase {
    #[serde(flatten)]
    pub database: AppDatabase,
    pub id: String,
    pub status: String,
    pub connection_string: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    pub region: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub live_url: String,
    #[serde(default)]
    pub services: Vec<DeployedService>,
    #[serde(default)]
    pub databases: Vec<ProvisionedDatabase>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub env_vars: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCost {
    pub monthly: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppData {
    pub app: App,
    pub estimated_deploy_time: String,
    pub cost: MonthlyCost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub id: String,
    pub name: String,
    pub status: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub id: String,
    pub name: String,
    pub status: String,
    pub engine: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastDeployment {
    pub id: String,
    pub status: String,
    pub created_at: String,
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStatusData {
    pub id: String,
    pub status: String,
    pub phase: String,
    pub progress: f64,
    #[serde(default)]
    pub services: Vec<ServiceStatus>,
    #[serde(default)]
    pub databases: Vec<DatabaseStatus>,
    pub last_deployment: Option<LastDeployment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleService {
    pub id: String,
    pub instance_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_size_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleAppRequest {
    pub services: Vec<ScaleService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingServiceStatus {
    pub id: String,
    pub status: String,
    pub estimated_completion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostChange {
    pub monthly_increase: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleAppData {
    pub app_id: String,
    pub scaling_operation_id: String,
    pub status: String,
    #[serde(default)]
    pub services: Vec<ScalingServiceStatus>,
    pub estimated_cost_change: CostChange,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDatabaseRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<DatabaseEngine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_nodes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConnection {
    pub uri: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    pub name: String,
    pub engine: String,
    pub version: String,
    pub size: String,
    pub region: String,
    pub num_nodes: u32,
    pub status: String,
    pub created_at: String,
    pub connection: DatabaseConnection,
    pub estimated_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatabaseData {
    pub database: Database,
    pub estimated_ready_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub slug: String,
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsData {
    pub regions: Vec<Region>,
}
