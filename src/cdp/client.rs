//! CDP client implementation
//!
//! High-level typed operations over one page target.

use crate::cdp::traits::{CdpClient, CdpConnection, EvaluationResult, NavigationResult};
use crate::cdp::types::{Cookie, EvaluateParams, EvaluateResponse, NavigateParams, RemoteObject};
use crate::Error;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::sync::Arc;
use tracing::debug;

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client over an established connection
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Parse a remote object into an evaluation result
    fn parse_remote_object(obj: &RemoteObject) -> EvaluationResult {
        match obj.r#type.as_str() {
            "string" => EvaluationResult::String(
                obj.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            "number" => {
                EvaluationResult::Number(obj.value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0))
            }
            "boolean" => EvaluationResult::Bool(
                obj.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false),
            ),
            "undefined" | "null" => EvaluationResult::Null,
            "object" | "function" | "bigint" | "symbol" => {
                match obj.value.clone() {
                    Some(serde_json::Value::Null) | None => EvaluationResult::Null,
                    Some(value) => EvaluationResult::Object(value),
                }
            }
            _ => EvaluationResult::Null,
        }
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    fn connection(&self) -> Arc<dyn CdpConnection> {
        Arc::clone(&self.connection)
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        debug!("Navigating to {}", url);

        let params = NavigateParams {
            url: url.to_string(),
            referrer: None,
        };

        let result = self
            .call_method("Page.navigate", serde_json::to_value(params)?)
            .await?;

        let error_text = result
            .get("errorText")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        if let Some(ref err) = error_text {
            // net::ERR_ABORTED and friends mean the load never started;
            // anything the server answered (including 404 pages) loads fine.
            return Err(Error::navigation_failed(format!("{}: {}", url, err)));
        }

        Ok(NavigationResult {
            url: result
                .get("frame")
                .and_then(|f| f.get("url"))
                .and_then(|u| u.as_str())
                .unwrap_or(url)
                .to_string(),
            error_text,
        })
    }

    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, Error> {
        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(await_promise),
            return_by_value: Some(true),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            return Err(Error::cdp(format!(
                "Script threw: {}",
                exception
                    .get("exception")
                    .and_then(|e| e.get("description"))
                    .and_then(|d| d.as_str())
                    .unwrap_or("unknown error")
            )));
        }

        let eval_response: EvaluateResponse = serde_json::from_value(result)?;
        Ok(Self::parse_remote_object(&eval_response.result))
    }

    async fn current_url(&self) -> Result<String, Error> {
        match self.evaluate("window.location.href", false).await? {
            EvaluationResult::String(url) => Ok(url),
            other => Err(Error::cdp(format!(
                "window.location.href returned {:?}",
                other
            ))),
        }
    }

    async fn get_cookies(&self) -> Result<Vec<Cookie>, Error> {
        let result = self
            .call_method("Network.getCookies", serde_json::json!({}))
            .await?;

        let cookies = result
            .get("cookies")
            .cloned()
            .unwrap_or(serde_json::Value::Array(vec![]));

        Ok(serde_json::from_value(cookies)?)
    }

    async fn set_cookie(&self, name: &str, value: &str, url: &str) -> Result<(), Error> {
        let params = crate::cdp::types::SetCookieParams {
            name: name.to_string(),
            value: value.to_string(),
            url: url.to_string(),
        };

        let _ = self
            .call_method("Network.setCookie", serde_json::to_value(params)?)
            .await?;

        Ok(())
    }

    async fn clear_cookies(&self) -> Result<(), Error> {
        let _ = self
            .call_method("Network.clearBrowserCookies", serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        let result = self
            .call_method(
                "Page.captureScreenshot",
                serde_json::json!({ "format": "png" }),
            )
            .await?;

        let data = result
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("No data in screenshot result"))?;

        BASE64
            .decode(data)
            .map_err(|e| Error::cdp(format!("Failed to decode screenshot: {}", e)))
    }

    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        debug!("Enabling domain: {}", domain);
        let method = format!("{}.enable", domain);
        let _ = self.call_method(&method, serde_json::json!({})).await?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_object_string() {
        let obj = RemoteObject {
            r#type: "string".to_string(),
            value: Some(serde_json::json!("test")),
            ..Default::default()
        };

        let result = CdpClientImpl::parse_remote_object(&obj);
        assert_eq!(result, EvaluationResult::String("test".to_string()));
    }

    #[test]
    fn test_parse_remote_object_number() {
        let obj = RemoteObject {
            r#type: "number".to_string(),
            value: Some(serde_json::json!(42.5)),
            ..Default::default()
        };

        let result = CdpClientImpl::parse_remote_object(&obj);
        assert_eq!(result, EvaluationResult::Number(42.5));
    }

    #[test]
    fn test_parse_remote_object_bool() {
        let obj = RemoteObject {
            r#type: "boolean".to_string(),
            value: Some(serde_json::json!(true)),
            ..Default::default()
        };

        let result = CdpClientImpl::parse_remote_object(&obj);
        assert_eq!(result, EvaluationResult::Bool(true));
    }

    #[test]
    fn test_parse_remote_object_undefined() {
        let obj = RemoteObject {
            r#type: "undefined".to_string(),
            ..Default::default()
        };

        assert!(CdpClientImpl::parse_remote_object(&obj).is_null());
    }

    #[test]
    fn test_parse_remote_object_null_object() {
        // `null` comes back as type=object, subtype=null, value=null
        let obj = RemoteObject {
            r#type: "object".to_string(),
            subtype: Some("null".to_string()),
            value: Some(serde_json::Value::Null),
            ..Default::default()
        };

        assert!(CdpClientImpl::parse_remote_object(&obj).is_null());
    }

    #[test]
    fn test_parse_remote_object_array() {
        let obj = RemoteObject {
            r#type: "object".to_string(),
            value: Some(serde_json::json!(["a", "b"])),
            ..Default::default()
        };

        match CdpClientImpl::parse_remote_object(&obj) {
            EvaluationResult::Object(v) => assert_eq!(v, serde_json::json!(["a", "b"])),
            other => panic!("expected Object, got {:?}", other),
        }
    }
}
