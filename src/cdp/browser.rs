//! CDP browser-level control
//!
//! Discovers the browser's own WebSocket endpoint, then creates and disposes
//! page targets. Every target is placed in its own isolated browser context
//! so tests can never observe each other's cookies or storage.

use crate::cdp::client::CdpClientImpl;
use crate::cdp::connection::CdpWebSocketConnection;
use crate::cdp::traits::{CdpBrowser, CdpClient, CdpConnection, TargetHandle};
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// CDP browser implementation
#[derive(Debug)]
pub struct CdpBrowserImpl {
    /// Devtools endpoint as configured (e.g., "ws://localhost:9222")
    endpoint: String,
    /// Lazily-established browser-level connection
    browser_connection: Mutex<Option<Arc<dyn CdpConnection>>>,
}

impl CdpBrowserImpl {
    /// Create a browser handle for a devtools endpoint
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            browser_connection: Mutex::new(None),
        }
    }

    /// The devtools HTTP endpoint derived from the WebSocket one
    fn http_endpoint(&self) -> String {
        self.endpoint
            .replace("ws://", "http://")
            .replace("wss://", "https://")
    }

    /// Discover the browser-level WebSocket URL via /json/version
    async fn discover_browser_ws_url(&self) -> Result<String, Error> {
        let url = format!("{}/json/version", self.http_endpoint());
        debug!("Fetching browser version from {}", url);

        let response: serde_json::Value = reqwest::get(&url)
            .await
            .map_err(|e| Error::websocket(format!("Failed to reach devtools endpoint: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::cdp(format!("Failed to parse /json/version: {}", e)))?;

        response
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::cdp("No webSocketDebuggerUrl in /json/version"))
    }

    /// Get or establish the browser-level connection
    async fn browser_connection(&self) -> Result<Arc<dyn CdpConnection>, Error> {
        let mut guard = self.browser_connection.lock().await;

        if let Some(connection) = guard.as_ref() {
            if connection.is_active() {
                return Ok(Arc::clone(connection));
            }
        }

        let ws_url = self.discover_browser_ws_url().await?;
        let connection =
            CdpWebSocketConnection::connect(ws_url).await? as Arc<dyn CdpConnection>;
        *guard = Some(Arc::clone(&connection));
        Ok(connection)
    }
}

#[async_trait]
impl CdpBrowser for CdpBrowserImpl {
    async fn create_isolated_target(&self) -> Result<TargetHandle, Error> {
        let browser = self.browser_connection().await?;

        // Fresh context = fresh cookie jar and storage
        let context = browser
            .send_command("Target.createBrowserContext", serde_json::json!({}))
            .await?;
        let browser_context_id = context
            .result
            .as_ref()
            .and_then(|r| r.get("browserContextId"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("No browserContextId in createBrowserContext result"))?
            .to_string();

        let target = browser
            .send_command(
                "Target.createTarget",
                serde_json::json!({
                    "url": "about:blank",
                    "browserContextId": browser_context_id,
                }),
            )
            .await?;
        let target_id = target
            .result
            .as_ref()
            .and_then(|r| r.get("targetId"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("No targetId in createTarget result"))?
            .to_string();

        info!(
            "Created isolated target {} in context {}",
            target_id, browser_context_id
        );

        let page_ws_url = format!("{}/devtools/page/{}", self.endpoint, target_id);
        let connection = CdpWebSocketConnection::connect(page_ws_url).await?;
        let client = Arc::new(CdpClientImpl::new(connection)) as Arc<dyn CdpClient>;

        client.enable_domain("Page").await?;
        client.enable_domain("Runtime").await?;
        client.enable_domain("Network").await?;

        Ok(TargetHandle {
            target_id,
            browser_context_id,
            client,
        })
    }

    async fn dispose_target(
        &self,
        target_id: &str,
        browser_context_id: &str,
    ) -> Result<(), Error> {
        let browser = self.browser_connection().await?;

        info!(
            "Disposing target {} and context {}",
            target_id, browser_context_id
        );

        let _ = browser
            .send_command(
                "Target.closeTarget",
                serde_json::json!({ "targetId": target_id }),
            )
            .await?;

        let _ = browser
            .send_command(
                "Target.disposeBrowserContext",
                serde_json::json!({ "browserContextId": browser_context_id }),
            )
            .await?;

        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        let guard = self.browser_connection.lock().await;
        if let Some(connection) = guard.as_ref() {
            connection.close().await?;
        }
        Ok(())
    }
}
