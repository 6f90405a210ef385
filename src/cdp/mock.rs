//! Mock CDP implementations for testing
//!
//! In-memory stand-ins for the CDP traits so every higher layer can be
//! exercised without a running browser.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cdp::traits::*;
use crate::cdp::types::Cookie;
use crate::Error;

/// Mock CDP connection with canned per-method responses
#[derive(Debug)]
pub struct MockCdpConnection {
    is_active: Arc<AtomicBool>,
    next_id: AtomicU64,
}

impl MockCdpConnection {
    /// Create a new mock CDP connection
    pub fn new() -> Self {
        Self {
            is_active: Arc::new(AtomicBool::new(true)),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MockCdpConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpConnection for MockCdpConnection {
    async fn send_command(
        &self,
        method: &str,
        _params: serde_json::Value,
    ) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::cdp("Connection is closed"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let result = match method {
            "Page.navigate" => serde_json::json!({
                "frameId": uuid::Uuid::new_v4().to_string(),
                "loaderId": uuid::Uuid::new_v4().to_string(),
            }),
            "Runtime.evaluate" => serde_json::json!({
                "result": { "type": "string", "value": "mock result" }
            }),
            "Page.captureScreenshot" => serde_json::json!({
                "data": "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg=="
            }),
            "Network.getCookies" => serde_json::json!({ "cookies": [] }),
            "Target.createBrowserContext" => serde_json::json!({
                "browserContextId": uuid::Uuid::new_v4().to_string(),
            }),
            "Target.createTarget" => serde_json::json!({
                "targetId": uuid::Uuid::new_v4().to_string(),
            }),
            _ => serde_json::json!({}),
        };

        Ok(CdpResponse {
            id,
            result: Some(result),
            error: None,
        })
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}

/// Mock CDP client
///
/// Evaluation results can be scripted with [`MockCdpClient::enqueue_eval`];
/// scripted results are consumed in FIFO order before the built-in
/// heuristics apply.
#[derive(Debug)]
pub struct MockCdpClient {
    connection: Arc<MockCdpConnection>,
    url: Arc<Mutex<Option<String>>>,
    cookies: Arc<Mutex<Vec<Cookie>>>,
    scripted_evals: Arc<Mutex<VecDeque<EvaluationResult>>>,
    eval_log: Arc<Mutex<Vec<String>>>,
}

impl MockCdpClient {
    /// Create a new mock CDP client
    pub fn new() -> Self {
        Self {
            connection: Arc::new(MockCdpConnection::new()),
            url: Arc::new(Mutex::new(None)),
            cookies: Arc::new(Mutex::new(Vec::new())),
            scripted_evals: Arc::new(Mutex::new(VecDeque::new())),
            eval_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a result for the next unscripted evaluation
    pub async fn enqueue_eval(&self, result: EvaluationResult) {
        self.scripted_evals.lock().await.push_back(result);
    }

    /// Scripts evaluated so far, in order
    pub async fn evaluated_scripts(&self) -> Vec<String> {
        self.eval_log.lock().await.clone()
    }
}

impl Default for MockCdpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpClient for MockCdpClient {
    fn connection(&self) -> Arc<dyn CdpConnection> {
        self.connection.clone()
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        *self.url.lock().await = Some(url.to_string());
        Ok(NavigationResult {
            url: url.to_string(),
            error_text: None,
        })
    }

    async fn evaluate(
        &self,
        script: &str,
        _await_promise: bool,
    ) -> Result<EvaluationResult, Error> {
        self.eval_log.lock().await.push(script.to_string());

        if let Some(result) = self.scripted_evals.lock().await.pop_front() {
            return Ok(result);
        }

        if script.contains("window.location.href") {
            let url = self.url.lock().await.clone().unwrap_or_default();
            Ok(EvaluationResult::String(url))
        } else if script.contains("document.readyState") {
            Ok(EvaluationResult::String("complete".to_string()))
        } else {
            Ok(EvaluationResult::Null)
        }
    }

    async fn current_url(&self) -> Result<String, Error> {
        Ok(self.url.lock().await.clone().unwrap_or_default())
    }

    async fn get_cookies(&self) -> Result<Vec<Cookie>, Error> {
        Ok(self.cookies.lock().await.clone())
    }

    async fn set_cookie(&self, name: &str, value: &str, url: &str) -> Result<(), Error> {
        self.cookies.lock().await.push(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: url.to_string(),
            path: "/".to_string(),
            http_only: false,
            secure: false,
        });
        Ok(())
    }

    async fn clear_cookies(&self) -> Result<(), Error> {
        self.cookies.lock().await.clear();
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        // Minimal PNG header
        Ok(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn enable_domain(&self, _domain: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn call_method(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;
        response.result.ok_or_else(|| Error::cdp("No result in response"))
    }
}

/// Mock CDP browser
#[derive(Debug)]
pub struct MockCdpBrowser {
    is_active: AtomicBool,
    disposed: Arc<Mutex<Vec<String>>>,
}

impl MockCdpBrowser {
    /// Create a new mock CDP browser
    pub fn new() -> Self {
        Self {
            is_active: AtomicBool::new(true),
            disposed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Target IDs disposed so far
    pub async fn disposed_targets(&self) -> Vec<String> {
        self.disposed.lock().await.clone()
    }
}

impl Default for MockCdpBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpBrowser for MockCdpBrowser {
    async fn create_isolated_target(&self) -> Result<TargetHandle, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::cdp("Browser is closed"));
        }

        Ok(TargetHandle {
            target_id: uuid::Uuid::new_v4().to_string(),
            browser_context_id: uuid::Uuid::new_v4().to_string(),
            client: Arc::new(MockCdpClient::new()),
        })
    }

    async fn dispose_target(
        &self,
        target_id: &str,
        _browser_context_id: &str,
    ) -> Result<(), Error> {
        self.disposed.lock().await.push(target_id.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::client::CdpClientImpl;

    #[tokio::test]
    async fn test_mock_connection_canned_responses() {
        let conn = MockCdpConnection::new();
        assert!(conn.is_active());

        let response = conn
            .send_command("Runtime.evaluate", serde_json::json!({}))
            .await
            .unwrap();
        assert!(response.result.is_some());
        assert!(response.error.is_none());

        conn.close().await.unwrap();
        assert!(!conn.is_active());
    }

    #[tokio::test]
    async fn test_client_impl_over_mock_connection() {
        // Drive the real client through the canned connection
        let client = CdpClientImpl::new(Arc::new(MockCdpConnection::new()));

        let result = client.evaluate("document.title", false).await.unwrap();
        assert_eq!(result.as_str(), Some("mock result"));

        let png = client.screenshot().await.unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let cookies = client.get_cookies().await.unwrap();
        assert!(cookies.is_empty());
    }

    #[tokio::test]
    async fn test_mock_client_scripted_evals() {
        let client = MockCdpClient::new();
        client.enqueue_eval(EvaluationResult::Bool(true)).await;

        let first = client.evaluate("anything", false).await.unwrap();
        assert_eq!(first.as_bool(), Some(true));

        // Heuristics after the queue drains
        client.navigate("http://localhost:3000/").await.unwrap();
        let href = client.evaluate("window.location.href", false).await.unwrap();
        assert_eq!(href.as_str(), Some("http://localhost:3000/"));

        let log = client.evaluated_scripts().await;
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_browser_lifecycle() {
        let browser = MockCdpBrowser::new();

        let target = browser.create_isolated_target().await.unwrap();
        assert!(!target.target_id.is_empty());

        browser
            .dispose_target(&target.target_id, &target.browser_context_id)
            .await
            .unwrap();
        assert_eq!(browser.disposed_targets().await, vec![target.target_id]);

        browser.close().await.unwrap();
        assert!(browser.create_isolated_target().await.is_err());
    }
}
