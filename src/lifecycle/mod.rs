//! Per-test orchestration
//!
//! [`TestLifecycle::run_test`] owns the scoped-acquisition discipline: a
//! fresh isolated session is created for the body and closed on every exit
//! path, including assertion panics. A failing test gets a screenshot
//! artifact before its browser goes away.

use crate::api::ApiClient;
use crate::config::Config;
use crate::page::{ArticlePage, HomePage, LoginPage};
use crate::report::Reporter;
use crate::session::traits::{BrowserSession, SessionFactory};
use crate::wait::WaitEngine;
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// How a single test ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    /// The body returned Ok
    Passed,
    /// The body returned a harness-level error (timeout, driver trouble)
    HarnessFailure(String),
    /// The body panicked, i.e. an assertion failed
    AssertionFailure(String),
}

/// Outcome record for one executed test
#[derive(Debug, Clone)]
pub struct TestOutcome {
    /// Test name as registered with the reporter
    pub name: String,
    /// Final status
    pub status: TestStatus,
    /// Failure screenshot path, when one was captured
    pub screenshot: Option<std::path::PathBuf>,
}

impl TestOutcome {
    /// True when the test passed
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Everything a test body gets to work with
///
/// Owns clones of the per-test resources so the body can run on its own
/// task; dropping the context never closes the session, the lifecycle does.
#[derive(Clone)]
pub struct TestContext {
    /// The isolated browser session for this test
    pub session: Arc<dyn BrowserSession>,
    /// Resolved configuration
    pub config: Config,
}

impl TestContext {
    /// The wait engine configured for this run
    pub fn wait(&self) -> WaitEngine {
        WaitEngine::new(self.config.wait_options())
    }

    /// An API client for the backend under test
    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::with_timeout(
            self.config.api_url.as_str(),
            std::time::Duration::from_millis(self.config.api_timeout_ms),
        )
    }

    /// The home page bound to this session
    pub fn home_page(&self) -> HomePage {
        HomePage::new(
            Arc::clone(&self.session),
            self.config.base_url.as_str(),
            self.wait(),
        )
    }

    /// The login page bound to this session
    pub fn login_page(&self) -> LoginPage {
        LoginPage::new(
            Arc::clone(&self.session),
            self.config.base_url.as_str(),
            self.wait(),
        )
    }

    /// The article page bound to this session
    pub fn article_page(&self) -> ArticlePage {
        ArticlePage::new(
            Arc::clone(&self.session),
            self.config.base_url.as_str(),
            self.wait(),
        )
    }
}

/// Orchestrates setup and teardown around test bodies
pub struct TestLifecycle {
    config: Config,
    factory: Arc<dyn SessionFactory>,
    reporter: Arc<dyn Reporter>,
}

impl TestLifecycle {
    /// Create a lifecycle over a session factory and a reporter
    pub fn new(config: Config, factory: Arc<dyn SessionFactory>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            config,
            factory,
            reporter,
        }
    }

    /// Run one test body inside a fresh, isolated session
    ///
    /// The session is closed on every exit path. A body that returns an
    /// error reports a harness failure (with the error's own diagnostic); a
    /// body that panics reports an assertion failure. The two are kept
    /// distinct so infrastructure trouble is never mistaken for an
    /// application regression.
    pub async fn run_test<F, Fut>(&self, name: &str, body: F) -> TestOutcome
    where
        F: FnOnce(TestContext) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.reporter.create_test(name, "");
        info!("Setting up test {}", name);

        let session = match self.factory.create_session().await {
            Ok(session) => session,
            Err(e) => {
                let diagnostic = format!("session setup failed: {}", e);
                self.reporter.fail(name, &diagnostic);
                return TestOutcome {
                    name: name.to_string(),
                    status: TestStatus::HarnessFailure(diagnostic),
                    screenshot: None,
                };
            }
        };

        let context = TestContext {
            session: Arc::clone(&session),
            config: self.config.clone(),
        };

        // The body runs on its own task so a panicking assertion unwinds
        // into a JoinError instead of tearing down the lifecycle.
        let result = tokio::spawn(body(context)).await;

        let status = match result {
            Ok(Ok(())) => TestStatus::Passed,
            Ok(Err(e)) => TestStatus::HarnessFailure(e.to_string()),
            Err(join_error) => {
                let message = join_error
                    .try_into_panic()
                    .ok()
                    .and_then(|panic| {
                        panic
                            .downcast_ref::<String>()
                            .cloned()
                            .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                    })
                    .unwrap_or_else(|| "test body aborted".to_string());
                TestStatus::AssertionFailure(message)
            }
        };

        let screenshot = if status == TestStatus::Passed {
            None
        } else {
            self.capture_failure_screenshot(name, &session).await
        };

        // Teardown runs regardless of what the body did
        if let Err(e) = session.close().await {
            warn!("Teardown of {} failed to close session: {}", name, e);
        }

        match &status {
            TestStatus::Passed => self.reporter.pass(name),
            TestStatus::HarnessFailure(diagnostic) => self.reporter.fail(name, diagnostic),
            TestStatus::AssertionFailure(message) => self.reporter.fail(name, message),
        }

        TestOutcome {
            name: name.to_string(),
            status,
            screenshot,
        }
    }

    /// Record a skipped test
    pub fn skip_test(&self, name: &str, reason: &str) {
        self.reporter.skip(name, reason);
    }

    /// Save a screenshot of the failing session, best effort
    async fn capture_failure_screenshot(
        &self,
        name: &str,
        session: &Arc<dyn BrowserSession>,
    ) -> Option<std::path::PathBuf> {
        let png = match session.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                warn!("Could not capture failure screenshot for {}: {}", name, e);
                return None;
            }
        };

        match self.write_screenshot(name, &png) {
            Ok(path) => {
                self.reporter
                    .info(name, &format!("screenshot saved to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                warn!("Could not write failure screenshot for {}: {}", name, e);
                None
            }
        }
    }

    fn write_screenshot(&self, name: &str, png: &[u8]) -> Result<std::path::PathBuf> {
        let dir = std::path::Path::new(&self.config.screenshot_dir);
        std::fs::create_dir_all(dir)?;

        let safe_name: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("{}_{}.png", safe_name, timestamp));

        std::fs::write(&path, png)?;
        Ok(path)
    }
}

impl std::fmt::Debug for TestLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestLifecycle")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
