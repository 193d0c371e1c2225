//! Configuration loader
//!
//! Loads trusted client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from a file
//! 3. Supports JSON and TOML formats (detected by extension)
//!
//! ## Environment Variables
//! Variable names are prefixed with the client name, uppercased, with `-`
//! mapped to `_`. For a client named `trusted-app`:
//! - `TRUSTED_APP_CLIENT_ID`: Client id (required)
//! - `TRUSTED_APP_CLIENT_SECRET`: Client secret (required)
//! - `TRUSTED_APP_TOKEN_URL`: Token endpoint, ending in `/token` (required)
//! - `TRUSTED_APP_SCOPES`: Scopes, comma or space separated
//! - `TRUSTED_APP_TIMEOUT_SECS`: Request timeout in seconds
//! - `TRUSTED_APP_USER_AGENT`: User agent sent with every request
//! - `TRUSTED_APP_DISABLE_PROXY`: Ignore `HTTP_PROXY`/`HTTPS_PROXY` when set
//!   to `1`, `true`, `yes` or `on`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use trusted_oauth_domain::{ClientCredentials, ClientError, Result, DEFAULT_TIMEOUT_SECS};

use crate::endpoints::Endpoints;

/// Settings for one trusted client
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedClientConfig {
    /// Name used to prefix environment variables
    #[serde(default)]
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Connect directly even when proxy variables are set
    #[serde(default)]
    pub disable_proxy: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl TrustedClientConfig {
    /// Credentials handed to the client
    #[must_use]
    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials::new(
            &self.client_id,
            &self.client_secret,
            &self.token_url,
            self.scopes.clone(),
        )
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check required fields and the token URL shape
    ///
    /// # Errors
    /// Returns `ClientError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(ClientError::Config("client_id must not be empty".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(ClientError::Config("client_secret must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("timeout_secs must be positive".to_string()));
        }
        Endpoints::from_token_url(&self.token_url).map(|_| ())
    }
}

// The secret never shows up in logs or panic messages.
impl std::fmt::Debug for TrustedClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustedClientConfig")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("disable_proxy", &self.disable_proxy)
            .finish()
    }
}

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to `path`.
///
/// # Errors
/// Returns `ClientError::Config` if neither source yields a configuration.
pub fn load(name: &str, path: Option<&Path>) -> Result<TrustedClientConfig> {
    match load_from_env(name) {
        Ok(config) => {
            tracing::info!(client = name, "Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(client = name, error = ?e, "Failed to load from environment, trying file");
            let path = path.ok_or_else(|| {
                ClientError::Config(format!(
                    "no environment configuration for '{name}' and no config file given"
                ))
            })?;
            let mut config = load_from_file(path)?;
            if config.name.is_empty() {
                config.name = name.to_string();
            }
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ClientError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env(name: &str) -> Result<TrustedClientConfig> {
    let prefix = env_prefix(name);

    let client_id = env_var(&format!("{prefix}_CLIENT_ID"))?;
    let client_secret = env_var(&format!("{prefix}_CLIENT_SECRET"))?;
    let token_url = env_var(&format!("{prefix}_TOKEN_URL"))?;

    let scopes = std::env::var(format!("{prefix}_SCOPES"))
        .map(|raw| parse_scopes(&raw))
        .unwrap_or_default();

    let timeout_secs = match std::env::var(format!("{prefix}_TIMEOUT_SECS")) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ClientError::Config(format!("Invalid timeout: {e}")))?,
        Err(_) => DEFAULT_TIMEOUT_SECS,
    };

    let user_agent = std::env::var(format!("{prefix}_USER_AGENT")).ok();
    let disable_proxy = env_bool(&format!("{prefix}_DISABLE_PROXY"), false);

    Ok(TrustedClientConfig {
        name: name.to_string(),
        client_id,
        client_secret,
        token_url,
        scopes,
        timeout_secs,
        user_agent,
        disable_proxy,
    })
}

/// Load configuration from a JSON or TOML file
///
/// # Errors
/// Returns `ClientError::Config` if the file is missing, unreadable, or
/// not valid for its format.
pub fn load_from_file(path: &Path) -> Result<TrustedClientConfig> {
    if !path.exists() {
        return Err(ClientError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ClientError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &Path) -> Result<TrustedClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ClientError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// `trusted-app` -> `TRUSTED_APP`
fn env_prefix(name: &str) -> String {
    name.trim().replace(['-', '.', ' '], "_").to_ascii_uppercase()
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ClientError::Config(format!("Missing required environment variable: {key}")))
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
