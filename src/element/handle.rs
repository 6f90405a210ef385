//! Element handle
//!
//! A handle binds a locator to a session and a wait engine. Reads wait for
//! presence, writes wait for visibility, and the locator is re-resolved on
//! every protocol round-trip. Absence is an observable state for queries
//! (`is_displayed` returns false) and a failure only for operations that
//! cannot proceed without the node.

use crate::element::js;
use crate::element::locator::Locator;
use crate::session::traits::BrowserSession;
use crate::wait::WaitEngine;
use crate::{Error, Result};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Summary of a resolved element
#[derive(Debug, Clone, Deserialize)]
pub struct ElementInfo {
    /// Lowercased tag name
    pub tag_name: String,
    /// Leading text content, if any
    #[serde(default)]
    pub text_content: Option<String>,
}

/// A wait-guarded reference to a UI control
///
/// Valid only for the session that created it; holds no DOM node, so it can
/// outlive any number of re-renders.
#[derive(Debug, Clone)]
pub struct ElementHandle {
    session: Arc<dyn BrowserSession>,
    locator: Locator,
    wait: WaitEngine,
}

impl ElementHandle {
    /// Bind a locator to a session
    pub fn new(session: Arc<dyn BrowserSession>, locator: Locator, wait: WaitEngine) -> Self {
        Self {
            session,
            locator,
            wait,
        }
    }

    /// The locator this handle resolves
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Resolve the element once, eagerly
    ///
    /// No waiting: this is the primitive the wait-guarded operations build
    /// on, and the one to use when absence should fail immediately.
    pub async fn find(&self) -> Result<ElementInfo> {
        let script = js::resolve_script(&self.locator);
        match self.session.evaluate(&script).await? {
            crate::cdp::EvaluationResult::String(json) => Ok(serde_json::from_str(&json)?),
            crate::cdp::EvaluationResult::Null => {
                Err(Error::element_not_found(self.locator.to_string()))
            }
            other => Err(Error::internal(format!(
                "resolve returned {:?} for {}",
                other, self.locator
            ))),
        }
    }

    /// True when the element is attached to the DOM right now
    pub async fn exists(&self) -> Result<bool> {
        let script = js::exists_script(&self.locator);
        Ok(self.session.evaluate(&script).await?.as_bool().unwrap_or(false))
    }

    /// True when the element is attached and visible right now
    ///
    /// Absence is a valid observable state here, never an error.
    pub async fn is_displayed(&self) -> Result<bool> {
        let script = js::displayed_script(&self.locator);
        Ok(self.session.evaluate(&script).await?.as_bool().unwrap_or(false))
    }

    /// True when the element is visible and not disabled right now
    pub async fn is_enabled(&self) -> Result<bool> {
        let script = js::interactable_script(&self.locator);
        Ok(self.session.evaluate(&script).await?.as_bool().unwrap_or(false))
    }

    /// Block until the element is visible
    pub async fn wait_until_visible(&self) -> Result<()> {
        let script = js::displayed_script(&self.locator);
        let description = format!("{} visible", self.locator);
        self.wait
            .wait_until(&description, || async {
                Ok(self
                    .session
                    .evaluate(&script)
                    .await?
                    .as_bool()
                    .unwrap_or(false))
            })
            .await
    }

    /// Block until the element is gone or hidden
    pub async fn wait_until_gone(&self) -> Result<()> {
        let script = js::displayed_script(&self.locator);
        let description = format!("{} gone", self.locator);
        self.wait
            .wait_until(&description, || async {
                Ok(!self
                    .session
                    .evaluate(&script)
                    .await?
                    .as_bool()
                    .unwrap_or(false))
            })
            .await
    }

    /// Read the element's text, waiting for it to be attached first
    pub async fn text(&self) -> Result<String> {
        let script = js::text_script(&self.locator);
        let description = format!("{} text readable", self.locator);
        let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let captured_in = Arc::clone(&captured);
        self.wait
            .wait_until(&description, move || {
                let captured = Arc::clone(&captured_in);
                let script = script.clone();
                async move {
                    match self.session.evaluate(&script).await? {
                        crate::cdp::EvaluationResult::String(text) => {
                            *captured.lock().await = Some(text);
                            Ok(true)
                        }
                        _ => Ok(false),
                    }
                }
            })
            .await?;

        let text = captured.lock().await.take();
        text.ok_or_else(|| Error::internal(format!("{}: text vanished after wait", self.locator)))
    }

    /// Read one attribute, waiting for the element to be attached first
    ///
    /// `Ok(None)` means the element exists but carries no such attribute.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        let script = js::attribute_script(&self.locator, name);
        let description = format!("{} attached for [{}]", self.locator, name);
        let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let captured_in = Arc::clone(&captured);
        self.wait
            .wait_until(&description, move || {
                let captured = Arc::clone(&captured_in);
                let script = script.clone();
                async move {
                    match self.session.evaluate(&script).await? {
                        crate::cdp::EvaluationResult::String(json) => {
                            *captured.lock().await = Some(json);
                            Ok(true)
                        }
                        _ => Ok(false),
                    }
                }
            })
            .await?;

        #[derive(Deserialize)]
        struct AttributeEnvelope {
            value: Option<String>,
        }

        let json = captured
            .lock()
            .await
            .take()
            .ok_or_else(|| Error::internal(format!("{}: attribute read vanished", self.locator)))?;
        let envelope: AttributeEnvelope = serde_json::from_str(&json)?;
        Ok(envelope.value)
    }

    /// Number of elements the locator currently matches
    ///
    /// Zero is an answer, not an error.
    pub async fn count(&self) -> Result<u64> {
        let script = self.locator.count_expr();
        match self.session.evaluate(&script).await? {
            crate::cdp::EvaluationResult::Number(n) => Ok(n.max(0.0) as u64),
            other => Err(Error::internal(format!(
                "count returned {:?} for {}",
                other, self.locator
            ))),
        }
    }

    /// Click the element, waiting for visibility first
    ///
    /// The node is re-resolved at click time; one that detached or got
    /// disabled between the wait and the action fails as an interaction
    /// error, not a silent no-op.
    pub async fn click(&self) -> Result<()> {
        self.wait_until_visible().await?;

        debug!("Clicking {}", self.locator);
        let script = js::click_script(&self.locator);
        self.map_action_status(self.session.evaluate(&script).await?, "click")
    }

    /// Type into the element, waiting for visibility first
    ///
    /// Sets the value wholesale and fires input/change, which is what the
    /// frontend's form bindings listen for.
    pub async fn type_text(&self, value: &str) -> Result<()> {
        self.wait_until_visible().await?;

        debug!("Typing into {}", self.locator);
        let script = js::set_value_script(&self.locator, value);
        self.map_action_status(self.session.evaluate(&script).await?, "type")
    }

    /// Clear the element's value
    pub async fn clear(&self) -> Result<()> {
        self.type_text("").await
    }

    fn map_action_status(
        &self,
        result: crate::cdp::EvaluationResult,
        action: &str,
    ) -> Result<()> {
        match result.as_str() {
            Some("ok") => Ok(()),
            Some("absent") => Err(Error::interaction(format!(
                "{}: element went stale before {}",
                self.locator, action
            ))),
            Some("disabled") => Err(Error::interaction(format!(
                "{}: element disabled, cannot {}",
                self.locator, action
            ))),
            other => Err(Error::internal(format!(
                "{}: unexpected {} status {:?}",
                self.locator, action, other
            ))),
        }
    }
}
