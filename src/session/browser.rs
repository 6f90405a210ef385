//! CDP-backed browser session
//!
//! Each session owns a page target inside its own isolated browser context,
//! so cookies and storage never leak between sessions. Close disposes the
//! whole context.

use crate::cdp::traits::{CdpBrowser, CdpClient, EvaluationResult, TargetHandle};
use crate::cdp::types::Cookie;
use crate::session::traits::{BrowserSession, SessionFactory};
use crate::Error;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Build a JS expression reading one localStorage key
fn storage_get_script(key: &str) -> String {
    format!("window.localStorage.getItem({})", serde_json::json!(key))
}

/// Build a JS expression writing one localStorage key
fn storage_set_script(key: &str, value: &str) -> String {
    format!(
        "window.localStorage.setItem({}, {})",
        serde_json::json!(key),
        serde_json::json!(value)
    )
}

/// Build a JS expression removing one localStorage key
fn storage_remove_script(key: &str) -> String {
    format!("window.localStorage.removeItem({})", serde_json::json!(key))
}

/// CDP-backed session implementation
#[derive(Debug)]
pub struct BrowserSessionImpl {
    id: String,
    target: TargetHandle,
    browser: Arc<dyn CdpBrowser>,
    is_active: AtomicBool,
}

impl BrowserSessionImpl {
    /// Wrap an isolated target as a session
    pub fn new(target: TargetHandle, browser: Arc<dyn CdpBrowser>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target,
            browser,
            is_active: AtomicBool::new(true),
        }
    }

    /// The CDP client driving this session's target
    fn client(&self) -> &Arc<dyn CdpClient> {
        &self.target.client
    }

    /// Fail fast when the session was already closed
    fn ensure_active(&self) -> Result<(), Error> {
        if self.is_active.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::session_closed(&self.id))
        }
    }
}

#[async_trait]
impl BrowserSession for BrowserSessionImpl {
    fn id(&self) -> &str {
        &self.id
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        self.ensure_active()?;
        info!("Session {}: navigating to {}", self.id, url);
        self.client().navigate(url).await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<EvaluationResult, Error> {
        self.ensure_active()?;
        self.client().evaluate(script, false).await
    }

    async fn current_url(&self) -> Result<String, Error> {
        self.ensure_active()?;
        self.client().current_url().await
    }

    async fn get_cookies(&self) -> Result<Vec<Cookie>, Error> {
        self.ensure_active()?;
        self.client().get_cookies().await
    }

    async fn set_cookie(&self, name: &str, value: &str, url: &str) -> Result<(), Error> {
        self.ensure_active()?;
        self.client().set_cookie(name, value, url).await
    }

    async fn clear_cookies(&self) -> Result<(), Error> {
        self.ensure_active()?;
        self.client().clear_cookies().await
    }

    async fn local_storage_get(&self, key: &str) -> Result<Option<String>, Error> {
        self.ensure_active()?;
        match self.evaluate(&storage_get_script(key)).await? {
            EvaluationResult::String(value) => Ok(Some(value)),
            EvaluationResult::Null => Ok(None),
            other => Err(Error::cdp(format!(
                "localStorage.getItem returned {:?}",
                other
            ))),
        }
    }

    async fn local_storage_set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.ensure_active()?;
        self.evaluate(&storage_set_script(key, value)).await?;
        Ok(())
    }

    async fn local_storage_remove(&self, key: &str) -> Result<(), Error> {
        self.ensure_active()?;
        self.evaluate(&storage_remove_script(key)).await?;
        Ok(())
    }

    async fn clear_storage(&self) -> Result<(), Error> {
        self.ensure_active()?;
        self.evaluate("window.localStorage.clear(); window.sessionStorage.clear()")
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        self.ensure_active()?;
        self.client().screenshot().await
    }

    async fn close(&self) -> Result<(), Error> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Session {}: closing", self.id);

        if let Err(e) = self
            .browser
            .dispose_target(&self.target.target_id, &self.target.browser_context_id)
            .await
        {
            // The browser may already be gone; the context dies with it.
            warn!("Session {}: dispose failed: {}", self.id, e);
        }

        self.client().connection().close().await
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

/// Factory producing CDP-backed sessions
pub struct CdpSessionFactory {
    browser: Arc<dyn CdpBrowser>,
}

impl CdpSessionFactory {
    /// Create a factory over a browser handle
    pub fn new(browser: Arc<dyn CdpBrowser>) -> Self {
        Self { browser }
    }
}

#[async_trait]
impl SessionFactory for CdpSessionFactory {
    async fn create_session(&self) -> Result<Arc<dyn BrowserSession>, Error> {
        let target = self.browser.create_isolated_target().await?;
        Ok(Arc::new(BrowserSessionImpl::new(
            target,
            Arc::clone(&self.browser),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::mock::MockCdpBrowser;

    async fn mock_session() -> (Arc<MockCdpBrowser>, BrowserSessionImpl) {
        let browser = Arc::new(MockCdpBrowser::new());
        let target = browser.create_isolated_target().await.unwrap();
        let session = BrowserSessionImpl::new(target, browser.clone() as Arc<dyn CdpBrowser>);
        (browser, session)
    }

    #[tokio::test]
    async fn test_navigate_and_current_url() {
        let (_browser, session) = mock_session().await;

        session.navigate("http://localhost:3000/login").await.unwrap();
        let url = session.current_url().await.unwrap();
        assert_eq!(url, "http://localhost:3000/login");
    }

    #[tokio::test]
    async fn test_storage_script_shapes() {
        let script = storage_get_script("jwtToken");
        assert_eq!(script, r#"window.localStorage.getItem("jwtToken")"#);

        // Keys and values with quotes must come out as valid JS literals
        let script = storage_set_script("k", r#"va"lue"#);
        assert!(script.contains(r#""va\"lue""#));
    }

    #[tokio::test]
    async fn test_close_disposes_target_and_is_idempotent() {
        let (browser, session) = mock_session().await;
        let target_id = session.target.target_id.clone();

        session.close().await.unwrap();
        assert!(!session.is_active());
        assert_eq!(browser.disposed_targets().await, vec![target_id]);

        // Second close is a no-op, not a second dispose
        session.close().await.unwrap();
        assert_eq!(browser.disposed_targets().await.len(), 1);
    }

    #[tokio::test]
    async fn test_use_after_close_fails() {
        let (_browser, session) = mock_session().await;
        session.close().await.unwrap();

        let err = session.navigate("http://localhost:3000").await.unwrap_err();
        assert!(matches!(err, Error::SessionClosed(_)));
    }

    #[tokio::test]
    async fn test_factory_produces_distinct_sessions() {
        let browser = Arc::new(MockCdpBrowser::new());
        let factory = CdpSessionFactory::new(browser as Arc<dyn CdpBrowser>);

        let a = factory.create_session().await.unwrap();
        let b = factory.create_session().await.unwrap();
        assert_ne!(a.id(), b.id());
    }
}
