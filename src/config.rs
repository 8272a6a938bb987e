use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
}

pub const ACCESS_TOKEN_KEY: &str = "donedep_access_token";
pub const REFRESH_TOKEN_KEY: &str = "donedep_refresh_token";
pub const ASSISTANT_API_KEY: &str = "donedep_openai_key";

pub const LOGIN_PATH: &str = "/login";
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";

const DEFAULT_API_URL: &str = "http://localhost:3001/api";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_TOKEN_DIR: &str = ".donedep/tokens";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const MIN_SESSION_KEY_LEN: usize = 64;
const DEFAULT_SESSION_IDLE_MINUTES: u64 = 60;

pub fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API base URL {0}: {1}")]
    InvalidApiUrl(String, url::ParseError),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddr(String),

    #[error("DONEDEP_SESSION_KEY must be at least {0} bytes")]
    SessionKeyTooShort(usize),

    #[error("Invalid DONEDEP_SESSION_IDLE_MINUTES: {0}")]
    InvalidIdleTimeout(String),
}

/// Runtime settings for the console, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub bind_addr: String,
    pub token_dir: PathBuf,
    pub production: bool,
    pub github_token: Option<String>,
    /// Signing key for the session cookie. A random key is used when unset,
    /// which signs every browser out on restart.
    pub session_key: Option<String>,
    pub request_timeout: Duration,
    /// How long a console session may sit unused before it is dropped from
    /// memory. Its token file stays, so the browser is still signed in.
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let api_url = env::var("DONEDEP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_base_url =
            Url::parse(&api_url).map_err(|e| ConfigError::InvalidApiUrl(api_url.clone(), e))?;

        let bind_addr = env::var("DONEDEP_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        if !bind_addr.contains(':') {
            return Err(ConfigError::InvalidBindAddr(bind_addr));
        }

        let token_dir = env::var("DONEDEP_TOKEN_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_DIR));

        let production = env::var("DONEDEP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let github_token = env::var("DONEDEP_GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let session_key = env::var("DONEDEP_SESSION_KEY").ok().filter(|k| !k.is_empty());
        if let Some(key) = &session_key {
            if key.len() < MIN_SESSION_KEY_LEN {
                return Err(ConfigError::SessionKeyTooShort(MIN_SESSION_KEY_LEN));
            }
        }

        let session_idle_timeout = match env::var("DONEDEP_SESSION_IDLE_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(|minutes| Duration::from_secs(minutes * 60))
                .map_err(|_| ConfigError::InvalidIdleTimeout(raw))?,
            Err(_) => Duration::from_secs(DEFAULT_SESSION_IDLE_MINUTES * 60),
        };

        Ok(AppConfig {
            api_base_url,
            bind_addr,
            token_dir,
            production,
            github_token,
            session_key,
            request_timeout: request_timeout(),
            session_idle_timeout,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            token_dir: PathBuf::from(DEFAULT_TOKEN_DIR),
            production: false,
            github_token: None,
            session_key: None,
            request_timeout: request_timeout(),
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_MINUTES * 60),
        }
    }
}
