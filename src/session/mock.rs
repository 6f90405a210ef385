//! Mock browser session for testing
//!
//! An in-memory page model: tests register elements by selector and the mock
//! answers the generated element scripts the way a live page would. Storage,
//! cookies, and navigation are plain maps and logs.

use crate::cdp::traits::EvaluationResult;
use crate::cdp::types::Cookie;
use crate::session::traits::BrowserSession;
use crate::Error;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// State of one mocked element
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Attached to the DOM
    pub present: bool,
    /// Rendered and visible
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// textContent
    pub text: String,
    /// Attribute map
    pub attributes: HashMap<String, String>,
    /// How many nodes the selector matches
    pub count: u64,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            present: true,
            visible: true,
            enabled: true,
            text: String::new(),
            attributes: HashMap::new(),
            count: 1,
        }
    }
}

impl MockElement {
    /// A present, visible element with the given text
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A present but hidden element
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Default::default()
        }
    }

    /// A present, visible but disabled element
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    url: String,
    storage: HashMap<String, String>,
    cookies: Vec<Cookie>,
    elements: HashMap<String, MockElement>,
    clicks: Vec<String>,
    typed: Vec<String>,
    navigations: Vec<String>,
}

/// Mock browser session
#[derive(Debug)]
pub struct MockBrowserSession {
    id: String,
    inner: Mutex<Inner>,
    is_active: std::sync::atomic::AtomicBool,
}

impl MockBrowserSession {
    /// Create an empty mock session
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            inner: Mutex::new(Inner::default()),
            is_active: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// Register (or replace) an element under a selector
    pub async fn register_element<S: Into<String>>(&self, selector: S, element: MockElement) {
        self.inner
            .lock()
            .await
            .elements
            .insert(selector.into(), element);
    }

    /// Remove an element, as a re-render dropping a node would
    pub async fn remove_element(&self, selector: &str) {
        self.inner.lock().await.elements.remove(selector);
    }

    /// Selectors clicked so far
    pub async fn clicks(&self) -> Vec<String> {
        self.inner.lock().await.clicks.clone()
    }

    /// Selectors typed into so far
    pub async fn typed(&self) -> Vec<String> {
        self.inner.lock().await.typed.clone()
    }

    /// URLs navigated to so far
    pub async fn navigations(&self) -> Vec<String> {
        self.inner.lock().await.navigations.clone()
    }

    /// Answer an element script for the selector's current state
    fn dispatch(script: &str, selector: &str, element: Option<&MockElement>, inner: &mut Inner) -> EvaluationResult {
        let present = element.map(|e| e.present).unwrap_or(false);
        let visible = present && element.map(|e| e.visible).unwrap_or(false);
        let enabled = present && element.map(|e| e.enabled).unwrap_or(false);

        if script.contains("getAttribute(") {
            return match element.filter(|e| e.present) {
                Some(el) => {
                    // The attribute name is the last embedded JSON literal
                    let value = el
                        .attributes
                        .iter()
                        .find(|(name, _)| script.contains(&serde_json::json!(name).to_string()))
                        .map(|(_, v)| v.clone());
                    EvaluationResult::String(
                        serde_json::json!({ "value": value }).to_string(),
                    )
                }
                None => EvaluationResult::Null,
            };
        }

        if script.contains("el.click()") {
            if !present {
                return EvaluationResult::String("absent".to_string());
            }
            if !enabled {
                return EvaluationResult::String("disabled".to_string());
            }
            inner.clicks.push(selector.to_string());
            return EvaluationResult::String("ok".to_string());
        }

        if script.contains("dispatchEvent") {
            if !present {
                return EvaluationResult::String("absent".to_string());
            }
            if !enabled {
                return EvaluationResult::String("disabled".to_string());
            }
            inner.typed.push(selector.to_string());
            return EvaluationResult::String("ok".to_string());
        }

        if script.contains("tagName") {
            return match element.filter(|e| e.present) {
                Some(el) => EvaluationResult::String(
                    serde_json::json!({
                        "tag_name": "div",
                        "text_content": el.text,
                    })
                    .to_string(),
                ),
                None => EvaluationResult::Null,
            };
        }

        if script.contains("!el.disabled") {
            return EvaluationResult::Bool(visible && enabled);
        }

        if script.contains("getClientRects") {
            return EvaluationResult::Bool(visible);
        }

        if script.contains("textContent") {
            return match element.filter(|e| e.present) {
                Some(el) => EvaluationResult::String(el.text.clone()),
                None => EvaluationResult::Null,
            };
        }

        if script.contains("snapshotLength") || script.contains(".length") {
            let count = element.filter(|e| e.present).map(|e| e.count).unwrap_or(0);
            return EvaluationResult::Number(count as f64);
        }

        EvaluationResult::Bool(present)
    }
}

impl Default for MockBrowserSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserSession for MockBrowserSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock().await;
        inner.url = url.to_string();
        inner.navigations.push(url.to_string());
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<EvaluationResult, Error> {
        let mut inner = self.inner.lock().await;

        if script.contains("window.location.href") {
            return Ok(EvaluationResult::String(inner.url.clone()));
        }

        // Match the selector embedded in the script as a JSON literal
        let matched = inner
            .elements
            .iter()
            .find(|(selector, _)| script.contains(&serde_json::json!(selector).to_string()))
            .map(|(selector, element)| (selector.clone(), element.clone()));

        Ok(match matched {
            Some((selector, element)) => {
                Self::dispatch(script, &selector, Some(&element), &mut inner)
            }
            None => Self::dispatch(script, "", None, &mut inner),
        })
    }

    async fn current_url(&self) -> Result<String, Error> {
        Ok(self.inner.lock().await.url.clone())
    }

    async fn get_cookies(&self) -> Result<Vec<Cookie>, Error> {
        Ok(self.inner.lock().await.cookies.clone())
    }

    async fn set_cookie(&self, name: &str, value: &str, url: &str) -> Result<(), Error> {
        self.inner.lock().await.cookies.push(Cookie {
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
        self.inner.lock().await.cookies.clear();
        Ok(())
    }

    async fn local_storage_get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.inner.lock().await.storage.get(key).cloned())
    }

    async fn local_storage_set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.inner
            .lock()
            .await
            .storage
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn local_storage_remove(&self, key: &str) -> Result<(), Error> {
        self.inner.lock().await.storage.remove(key);
        Ok(())
    }

    async fn clear_storage(&self) -> Result<(), Error> {
        self.inner.lock().await.storage.clear();
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        Ok(vec![0x89, 0x50, 0x4E, 0x47])
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active
            .store(false, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// Factory handing out fresh mock sessions and remembering them
pub struct MockSessionFactory {
    created: Mutex<Vec<std::sync::Arc<MockBrowserSession>>>,
}

impl MockSessionFactory {
    /// Create an empty factory
    pub fn new() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
        }
    }

    /// Every session this factory has produced, in order
    pub async fn created_sessions(&self) -> Vec<std::sync::Arc<MockBrowserSession>> {
        self.created.lock().await.clone()
    }
}

impl Default for MockSessionFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl crate::session::traits::SessionFactory for MockSessionFactory {
    async fn create_session(
        &self,
    ) -> Result<std::sync::Arc<dyn BrowserSession>, Error> {
        let session = std::sync::Arc::new(MockBrowserSession::new());
        self.created.lock().await.push(std::sync::Arc::clone(&session));
        Ok(session)
    }
}
