//! CDP (Chrome DevTools Protocol) layer traits
//!
//! Abstract interfaces for CDP communication. The higher layers only ever
//! see these traits, so any CDP-compatible driver (or a mock) can stand in.

use crate::cdp::types::Cookie;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// CDP response representation
#[derive(Debug, Clone)]
pub struct CdpResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    pub result: Option<Value>,
    /// Error if any
    pub error: Option<CdpErrorInfo>,
}

/// CDP error representation
#[derive(Debug, Clone)]
pub struct CdpErrorInfo {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
}

/// CDP connection trait
///
/// Represents a WebSocket connection to a Chrome DevTools Protocol target.
#[async_trait]
pub trait CdpConnection: Send + Sync + std::fmt::Debug {
    /// Send a CDP command and wait for the matching response
    async fn send_command(&self, method: &str, params: Value) -> Result<CdpResponse, crate::Error>;

    /// Close the connection
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if the connection is active
    fn is_active(&self) -> bool;
}

/// CDP client trait
///
/// High-level typed operations over one page target. Commands issued through
/// a client execute strictly in the order they are awaited; the underlying
/// protocol is serial per target.
#[async_trait]
pub trait CdpClient: Send + Sync + std::fmt::Debug {
    /// Get the underlying connection
    fn connection(&self) -> Arc<dyn CdpConnection>;

    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<NavigationResult, crate::Error>;

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str, await_promise: bool)
        -> Result<EvaluationResult, crate::Error>;

    /// URL of the page as the browser currently sees it
    async fn current_url(&self) -> Result<String, crate::Error>;

    /// Cookies visible to the current page
    async fn get_cookies(&self) -> Result<Vec<Cookie>, crate::Error>;

    /// Set a cookie for the given URL
    async fn set_cookie(&self, name: &str, value: &str, url: &str) -> Result<(), crate::Error>;

    /// Clear all browser cookies in this target's context
    async fn clear_cookies(&self) -> Result<(), crate::Error>;

    /// Capture a PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>, crate::Error>;

    /// Enable a CDP domain
    async fn enable_domain(&self, domain: &str) -> Result<(), crate::Error>;

    /// Call a raw CDP method (returns JSON Value)
    async fn call_method(&self, method: &str, params: Value) -> Result<Value, crate::Error>;
}

/// Navigation result
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// URL after navigation
    pub url: String,
    /// Loader-reported error text, if the navigation failed outright
    pub error_text: Option<String>,
}

/// JavaScript evaluation result
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    /// String value
    String(String),
    /// Number value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Null value
    Null,
    /// Object/Array (as JSON)
    Object(Value),
}

impl EvaluationResult {
    /// The boolean value, if this result is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EvaluationResult::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string value, if this result is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EvaluationResult::String(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric value, if this result is one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EvaluationResult::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True when the result is null/undefined
    pub fn is_null(&self) -> bool {
        matches!(self, EvaluationResult::Null)
    }
}

/// A page target living inside an isolated browser context
///
/// Both IDs are needed at teardown: the target is closed first, then the
/// context it lives in is disposed.
#[derive(Debug, Clone)]
pub struct TargetHandle {
    /// Target (page) ID
    pub target_id: String,
    /// Isolated browser context ID owning the target
    pub browser_context_id: String,
    /// Client connected to the target
    pub client: Arc<dyn CdpClient>,
}

/// CDP browser trait
///
/// Browser-level operations: creating isolated targets and tearing them down.
#[async_trait]
pub trait CdpBrowser: Send + Sync + std::fmt::Debug {
    /// Create a fresh page target inside a new isolated browser context
    ///
    /// The context gives the target its own cookie jar and storage, so two
    /// targets created this way can never observe each other's state.
    async fn create_isolated_target(&self) -> Result<TargetHandle, crate::Error>;

    /// Close a target and dispose the browser context that owned it
    async fn dispose_target(
        &self,
        target_id: &str,
        browser_context_id: &str,
    ) -> Result<(), crate::Error>;

    /// Close the browser-level connection
    async fn close(&self) -> Result<(), crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_result_accessors() {
        assert_eq!(EvaluationResult::Bool(true).as_bool(), Some(true));
        assert_eq!(EvaluationResult::String("x".into()).as_str(), Some("x"));
        assert_eq!(EvaluationResult::Number(3.0).as_f64(), Some(3.0));
        assert!(EvaluationResult::Null.is_null());
        assert_eq!(EvaluationResult::Null.as_bool(), None);
    }
}
