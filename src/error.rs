//! Unified error types for Conduit-Probe

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Conduit-Probe
///
/// HTTP error statuses (401, 404, 422, 5xx) are NOT errors here: they come
/// back as [`crate::api::ApiResponse`] values for test bodies to assert on.
/// Only harness-level failures (timeouts, driver trouble, transport faults)
/// surface through this enum.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Network-level API transport failure (connection refused, DNS, timeout)
    #[error("API transport error: {0}")]
    Api(#[from] reqwest::Error),

    /// A wait predicate never became true
    #[error("wait timed out after {elapsed_ms}ms: {condition}")]
    WaitTimeout {
        /// Human-readable description of the condition that was polled
        condition: String,
        /// Milliseconds spent polling before giving up
        elapsed_ms: u64,
    },

    /// Element resolution failed
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Element interaction failed (stale, disabled, detached mid-action)
    #[error("Interaction failed: {0}")]
    Interaction(String),

    /// Session used after close
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// Navigation failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new wait-timeout error
    pub fn wait_timeout<S: Into<String>>(condition: S, elapsed: std::time::Duration) -> Self {
        Error::WaitTimeout {
            condition: condition.into(),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(locator: S) -> Self {
        Error::ElementNotFound(locator.into())
    }

    /// Create a new interaction error
    pub fn interaction<S: Into<String>>(msg: S) -> Self {
        Error::Interaction(msg.into())
    }

    /// Create a new session closed error
    pub fn session_closed<S: Into<String>>(id: S) -> Self {
        Error::SessionClosed(id.into())
    }

    /// Create a new navigation failed error
    pub fn navigation_failed<S: Into<String>>(msg: S) -> Self {
        Error::NavigationFailed(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// True for timeouts a caller may legitimately interpret as "not present"
    pub fn is_wait_timeout(&self) -> bool {
        matches!(self, Error::WaitTimeout { .. })
    }
}
