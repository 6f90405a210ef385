//! Page object base
//!
//! Holds the session, the wait engine, and the three markers that classify a
//! live page. Navigation blocks until the page settles into a terminal
//! state, which removes ad hoc sleeps from test bodies entirely.

use crate::element::{ElementHandle, Locator};
use crate::session::traits::BrowserSession;
use crate::wait::WaitEngine;
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Observable lifecycle state of a screen
///
/// `Loading` is the only non-terminal state; navigation does not hand
/// control back while the page is still in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Still rendering; no terminal marker visible yet
    Loading,
    /// The page-defining marker is visible
    Loaded,
    /// The not-found marker is visible
    NotFound,
    /// The error banner is visible
    Error,
}

/// Shared base for all page objects
#[derive(Debug, Clone)]
pub struct PageObject {
    session: Arc<dyn BrowserSession>,
    wait: WaitEngine,
    base_url: String,
    marker: Locator,
    not_found_marker: Locator,
    error_marker: Locator,
}

impl PageObject {
    /// Create a base for a screen whose presence `marker` defines
    pub fn new(
        session: Arc<dyn BrowserSession>,
        base_url: impl Into<String>,
        marker: Locator,
        wait: WaitEngine,
    ) -> Self {
        Self {
            session,
            wait,
            base_url: base_url.into(),
            marker,
            not_found_marker: Locator::css(".not-found, .error-message"),
            error_marker: Locator::css("[class*='error']"),
        }
    }

    /// Override the not-found marker
    pub fn with_not_found_marker(mut self, marker: Locator) -> Self {
        self.not_found_marker = marker;
        self
    }

    /// Override the error marker
    pub fn with_error_marker(mut self, marker: Locator) -> Self {
        self.error_marker = marker;
        self
    }

    /// The session this page drives
    pub fn session(&self) -> &Arc<dyn BrowserSession> {
        &self.session
    }

    /// The wait engine pages and their elements share
    pub fn wait(&self) -> &WaitEngine {
        &self.wait
    }

    /// An element handle scoped to this page's session
    pub fn handle(&self, locator: Locator) -> ElementHandle {
        ElementHandle::new(Arc::clone(&self.session), locator, self.wait.clone())
    }

    /// Navigate to `path` under the base URL and block until the page settles
    ///
    /// Returns the terminal state reached. `NotFound` and `Error` are
    /// results, not failures: a test probing a dead slug wants exactly that
    /// answer. Only a page that never leaves `Loading` surfaces an error
    /// (the wait timeout, with the elapsed time in the diagnostic).
    pub async fn open(&self, path: &str) -> Result<PageState> {
        let url = format!("{}{}", self.base_url, path);
        info!("Opening {}", url);

        self.session.navigate(&url).await?;
        self.await_settled().await
    }

    /// Block until the current page reaches a terminal state
    pub async fn await_settled(&self) -> Result<PageState> {
        let settled: Arc<Mutex<PageState>> = Arc::new(Mutex::new(PageState::Loading));

        let settled_in = Arc::clone(&settled);
        self.wait
            .wait_until(&format!("{} settled", self.marker), move || {
                let settled = Arc::clone(&settled_in);
                async move {
                    let state = self.state().await?;
                    if state == PageState::Loading {
                        Ok(false)
                    } else {
                        *settled.lock().await = state;
                        Ok(true)
                    }
                }
            })
            .await?;

        let state = *settled.lock().await;
        debug!("Page settled: {:?}", state);
        Ok(state)
    }

    /// Classify the page as it is right now
    ///
    /// A single probe with no waiting; `Loading` means no marker has shown
    /// up yet, not that one never will.
    pub async fn state(&self) -> Result<PageState> {
        if self.handle(self.marker.clone()).is_displayed().await? {
            return Ok(PageState::Loaded);
        }
        if self
            .handle(self.not_found_marker.clone())
            .is_displayed()
            .await?
        {
            return Ok(PageState::NotFound);
        }
        if self.handle(self.error_marker.clone()).is_displayed().await? {
            return Ok(PageState::Error);
        }
        Ok(PageState::Loading)
    }

    /// True when the page has settled on its not-found state
    pub async fn is_page_not_found(&self) -> Result<bool> {
        Ok(self.state().await? == PageState::NotFound)
    }

    /// True when the page-defining marker is visible
    pub async fn is_displayed(&self) -> Result<bool> {
        self.handle(self.marker.clone()).is_displayed().await
    }

    /// Explicit synchronization point after an interaction
    ///
    /// Actions that trigger backend calls (favorite, follow) settle after a
    /// variable network delay; callers that skip this and read immediately
    /// accept the race as their own.
    pub async fn wait_for_state_change<F, Fut>(
        &self,
        description: &str,
        predicate: F,
    ) -> Result<()>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        self.wait.wait_until(description, predicate).await
    }

    /// Block until the browser URL contains `fragment`
    pub async fn wait_until_url_contains(&self, fragment: &str) -> Result<()> {
        let description = format!("url contains '{}'", fragment);
        self.wait
            .wait_until(&description, || async {
                Ok(self.session.current_url().await?.contains(fragment))
            })
            .await
    }

    /// The URL the browser currently shows
    pub async fn current_url(&self) -> Result<String> {
        self.session.current_url().await
    }
}
