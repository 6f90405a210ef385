//! Session traits
//!
//! Abstract interfaces for the per-test browser session and its factory.

use crate::cdp::traits::EvaluationResult;
use crate::cdp::types::Cookie;
use async_trait::async_trait;
use std::sync::Arc;

/// Browser session trait
///
/// An isolated, per-test browser context: cookies, storage, and navigation
/// state belong to exactly one test execution. All operations are
/// blocking from the caller's point of view and execute in call order; the
/// underlying driver protocol is serial per session.
#[async_trait]
pub trait BrowserSession: Send + Sync + std::fmt::Debug {
    /// Session ID
    fn id(&self) -> &str;

    /// Navigate the session to a URL
    async fn navigate(&self, url: &str) -> Result<(), crate::Error>;

    /// Evaluate JavaScript in the current page
    async fn evaluate(&self, script: &str) -> Result<EvaluationResult, crate::Error>;

    /// URL the browser currently shows
    async fn current_url(&self) -> Result<String, crate::Error>;

    /// Cookies in this session's jar
    async fn get_cookies(&self) -> Result<Vec<Cookie>, crate::Error>;

    /// Set a cookie scoped to the given URL
    async fn set_cookie(&self, name: &str, value: &str, url: &str) -> Result<(), crate::Error>;

    /// Clear this session's cookies
    async fn clear_cookies(&self) -> Result<(), crate::Error>;

    /// Read a local-storage entry
    async fn local_storage_get(&self, key: &str) -> Result<Option<String>, crate::Error>;

    /// Write a local-storage entry
    async fn local_storage_set(&self, key: &str, value: &str) -> Result<(), crate::Error>;

    /// Remove a local-storage entry
    async fn local_storage_remove(&self, key: &str) -> Result<(), crate::Error>;

    /// Clear local storage entirely
    async fn clear_storage(&self) -> Result<(), crate::Error>;

    /// Capture a PNG screenshot of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>, crate::Error>;

    /// Close the session and release the browser resources
    ///
    /// Idempotent: closing an already-closed session is a no-op.
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if the session is still usable
    fn is_active(&self) -> bool;
}

/// Session factory trait
///
/// Produces fresh, isolated sessions. The lifecycle layer owns one factory
/// and asks it for a session per test.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Create a fresh session with empty cookies and storage
    async fn create_session(&self) -> Result<Arc<dyn BrowserSession>, crate::Error>;
}
