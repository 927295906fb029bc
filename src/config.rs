//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.prod.whoop.com/developer/v2";
const DEFAULT_AUTH_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/auth";
const DEFAULT_TOKEN_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/token";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// WHOOP OAuth client ID (public)
    pub whoop_client_id: String,
    /// WHOOP OAuth client secret
    pub whoop_client_secret: String,
    /// Callback URL registered with WHOOP
    pub whoop_redirect_uri: String,
    /// Bearer key the assistant must present on `/whoop/*` routes
    pub internal_api_key: String,
    /// Key used to sign the OAuth `state` parameter (raw bytes)
    pub oauth_state_key: Vec<u8>,
    /// Directory holding `token.json`
    pub data_dir: PathBuf,
    /// Server port
    pub port: u16,

    // --- Upstream endpoints (overridable for tests) ---
    pub whoop_api_base: String,
    pub whoop_auth_url: String,
    pub whoop_token_url: String,
    /// Timeout applied to every upstream request
    pub http_timeout: Duration,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            whoop_client_id: "test_client_id".to_string(),
            whoop_client_secret: "test_secret".to_string(),
            whoop_redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            internal_api_key: "test_api_key".to_string(),
            oauth_state_key: b"test_state_key_32_bytes_minimum!".to_vec(),
            data_dir: PathBuf::from("data"),
            port: 3000,
            whoop_api_base: DEFAULT_API_BASE.to_string(),
            whoop_auth_url: DEFAULT_AUTH_URL.to_string(),
            whoop_token_url: DEFAULT_TOKEN_URL.to_string(),
            http_timeout: Duration::from_secs(5),
        }
    }

    /// Point the upstream URLs at a mock server (`base` without trailing slash).
    pub fn with_upstream(mut self, base: &str) -> Self {
        self.whoop_api_base = format!("{}/developer/v2", base);
        self.whoop_auth_url = format!("{}/oauth/oauth2/auth", base);
        self.whoop_token_url = format!("{}/oauth/oauth2/token", base);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let whoop_client_secret = required("WHOOP_CLIENT_SECRET")?;
        let oauth_state_key = env::var("OAUTH_STATE_KEY")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|_| whoop_client_secret.clone())
            .into_bytes();

        let data_dir = match env::var("DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) if env::var("APP_ENV").as_deref() == Ok("production") => PathBuf::from("/data"),
            Err(_) => PathBuf::from("data"),
        };

        let http_timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            whoop_client_id: required("WHOOP_CLIENT_ID")?,
            whoop_client_secret,
            whoop_redirect_uri: required("WHOOP_REDIRECT_URI")?,
            internal_api_key: required("INTERNAL_API_KEY")?,
            oauth_state_key,
            data_dir,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            whoop_api_base: env::var("WHOOP_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            whoop_auth_url: env::var("WHOOP_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            whoop_token_url: env::var("WHOOP_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Location of the persisted credential record.
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("token.json")
    }
}

/// Read a required variable, trimming stray whitespace from secret bindings.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
