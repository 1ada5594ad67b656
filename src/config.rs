//! Configuration loader for the `homewatch-dashboard` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Smart-home REST backend base URL.
    pub api_url: String,

    /// Bearer token to start with; the dashboard waits for one if unset.
    pub api_token: Option<String>,

    /// How long a backend call waits for an auth token.
    pub auth_wait: Duration,

    /// Per-request timeout for backend calls.
    pub http_timeout: Duration,

    /// Port the dashboard API listens on.
    pub port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `BACKEND_API_URL` – smart-home REST backend base URL
///
/// Optional:
/// - `BACKEND_API_TOKEN` – initial bearer token (default: none)
/// - `AUTH_WAIT_MS` – auth wait bound in milliseconds (default: 5000)
/// - `HTTP_TIMEOUT_SECS` – backend request timeout (default: 30)
/// - `DASHBOARD_PORT` – listen port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let api_url = require_env!("BACKEND_API_URL");
    let api_token = env::var("BACKEND_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    let auth_wait = Duration::from_millis(parse_env_u64!("AUTH_WAIT_MS", 5000));
    let http_timeout = Duration::from_secs(parse_env_u64!("HTTP_TIMEOUT_SECS", 30));
    let port = parse_env_u64!("DASHBOARD_PORT", 8080);
    let port = u16::try_from(port).map_err(|_| anyhow!("Invalid DASHBOARD_PORT: {}", port))?;

    Ok(Config {
        api_url,
        api_token,
        auth_wait,
        http_timeout,
        port,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// The token is masked; only whether one was supplied is shown.
    pub fn log_config(&self) {
        // ---
        let masked_token = match &self.api_token {
            Some(_) => "****",
            None => "(unset, waiting for session)",
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  BACKEND_API_URL   : {}", self.api_url);
        tracing::info!("  BACKEND_API_TOKEN : {}", masked_token);
        tracing::info!("  AUTH_WAIT_MS      : {}", self.auth_wait.as_millis());
        tracing::info!("  HTTP_TIMEOUT_SECS : {}", self.http_timeout.as_secs());
        tracing::info!("  DASHBOARD_PORT    : {}", self.port);
    }
}
