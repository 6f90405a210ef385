//! Configuration management for Conduit-Probe
//!
//! Resolution order follows the suite convention: defaults, then a TOML file
//! if one is given, then environment variables. Environment always wins.

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Harness configuration
///
/// The harness only ever consumes the resolved values; loading and precedence
/// are handled here, never inside the core components.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the deployed frontend
    pub base_url: String,

    /// Base URL of the backend REST API
    pub api_url: String,

    /// Browser-level CDP WebSocket endpoint
    pub cdp_endpoint: String,

    /// Seeded test user email
    pub user_email: String,

    /// Seeded test user password
    pub user_password: String,

    /// Default wait timeout in milliseconds
    pub wait_timeout_ms: u64,

    /// Poll interval for wait predicates in milliseconds
    pub poll_interval_ms: u64,

    /// Bounded timeout for API calls in milliseconds
    pub api_timeout_ms: u64,

    /// Directory for failure screenshots
    pub screenshot_dir: String,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_url: "http://localhost:8080".to_string(),
            cdp_endpoint: "ws://localhost:9222".to_string(),
            user_email: "john@example.com".to_string(),
            user_password: "password123".to_string(),
            wait_timeout_ms: 10_000,
            poll_interval_ms: 300,
            api_timeout_ms: 15_000,
            screenshot_dir: "target/probe/screenshots".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables over built-in defaults
    pub fn from_env() -> Result<Self> {
        Config::default().apply_env()
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.apply_env()
    }

    /// Overlay `CONDUIT_*` environment variables onto `self`
    fn apply_env(mut self) -> Result<Self> {
        if let Ok(base_url) = env::var("CONDUIT_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(api_url) = env::var("CONDUIT_API_URL") {
            self.api_url = api_url;
        }

        if let Ok(endpoint) = env::var("CONDUIT_CDP_ENDPOINT") {
            self.cdp_endpoint = endpoint;
        }

        if let Ok(email) = env::var("CONDUIT_USER_EMAIL") {
            self.user_email = email;
        }

        if let Ok(password) = env::var("CONDUIT_USER_PASSWORD") {
            self.user_password = password;
        }

        if let Ok(timeout) = env::var("CONDUIT_WAIT_TIMEOUT_MS") {
            self.wait_timeout_ms = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid CONDUIT_WAIT_TIMEOUT_MS"))?;
        }

        if let Ok(interval) = env::var("CONDUIT_POLL_INTERVAL_MS") {
            self.poll_interval_ms = interval
                .parse()
                .map_err(|_| Error::configuration("Invalid CONDUIT_POLL_INTERVAL_MS"))?;
        }

        if let Ok(timeout) = env::var("CONDUIT_API_TIMEOUT_MS") {
            self.api_timeout_ms = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid CONDUIT_API_TIMEOUT_MS"))?;
        }

        if let Ok(dir) = env::var("CONDUIT_SCREENSHOT_DIR") {
            self.screenshot_dir = dir;
        }

        if let Ok(log_level) = env::var("CONDUIT_LOG_LEVEL") {
            self.log_level = log_level;
        }

        Ok(self)
    }

    /// Wait options derived from the configured timeout and poll interval
    pub fn wait_options(&self) -> crate::wait::WaitOptions {
        crate::wait::WaitOptions {
            timeout: std::time::Duration::from_millis(self.wait_timeout_ms),
            poll_interval: std::time::Duration::from_millis(self.poll_interval_ms),
        }
    }
}
