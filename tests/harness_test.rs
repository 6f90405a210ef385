//! Full-stack harness tests over a real WebSocket CDP transport
//!
//! The mock Chrome server stands in for the browser. Everything above it
//! (connection, client, session, elements, page objects, lifecycle) is the
//! real code under test.


use conduit_probe::cdp::{
    CdpBrowser, CdpClient, CdpClientImpl, CdpWebSocketConnection, MockCdpBrowser, TargetHandle,
};
use conduit_probe::config::Config;
use conduit_probe::lifecycle::TestLifecycle;
use conduit_probe::page::{ArticlePage, HomePage, PageState};
use conduit_probe::report::{NullReporter, Reporter};
use conduit_probe::session::{
    auth, AuthToken, BrowserSession, BrowserSessionImpl, SessionFactory,
};
use conduit_probe::wait::{WaitEngine, WaitOptions};
use mock_chrome::MockChromeServer;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "http://localhost:3000";

fn fast_wait() -> WaitEngine {
    WaitEngine::new(WaitOptions {
        timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(25),
    })
}

/// Open a session whose transport is a live WebSocket to the mock browser
async fn session_over(server: &MockChromeServer) -> Arc<dyn BrowserSession> {
    conduit_probe::report::init_logging("info");

    let connection = CdpWebSocketConnection::connect(server.ws_endpoint())
        .await
        .expect("ws connect");
    let client: Arc<dyn CdpClient> = Arc::new(CdpClientImpl::new(connection));

    let target = TargetHandle {
        target_id: "target-0".to_string(),
        browser_context_id: "context-0".to_string(),
        client,
    };

    let browser: Arc<dyn CdpBrowser> = Arc::new(MockCdpBrowser::new());
    Arc::new(BrowserSessionImpl::new(target, browser))
}

#[tokio::test]
async fn navigate_and_read_url_over_websocket() {
    let server = MockChromeServer::start().await.expect("mock chrome");
    let session = session_over(&server).await;

    session
        .navigate("http://localhost:3000/login")
        .await
        .expect("navigate");
    let url = session.current_url().await.expect("current url");
    assert_eq!(url, "http://localhost:3000/login");

    session.close().await.expect("close");
}

#[tokio::test]
async fn home_page_open_settles_loaded() {
    let server = MockChromeServer::start().await.expect("mock chrome");
    let session = session_over(&server).await;

    let home = HomePage::new(Arc::clone(&session), BASE_URL, fast_wait());
    let state = home.open().await.expect("open");
    assert_eq!(state, PageState::Loaded);

    session.close().await.expect("close");
}

#[tokio::test]
async fn article_page_reads_title_after_settling() {
    let server = MockChromeServer::start().await.expect("mock chrome");
    let session = session_over(&server).await;

    let article = ArticlePage::new(Arc::clone(&session), BASE_URL, fast_wait());
    let state = article.open("welcome-to-realworld").await.expect("open");
    assert_eq!(state, PageState::Loaded);
    assert_eq!(
        article.article_title().await.expect("title"),
        "Welcome to RealWorld"
    );

    session.close().await.expect("close");
}

#[tokio::test]
async fn dead_slug_settles_on_not_found_within_timeout() {
    let server = MockChromeServer::start().await.expect("mock chrome");
    let session = session_over(&server).await;

    let article = ArticlePage::new(Arc::clone(&session), BASE_URL, fast_wait());
    let state = article
        .open("nonexistent-article-that-does-not-exist-12345")
        .await
        .expect("open");

    assert_eq!(state, PageState::NotFound);
    assert!(article.is_page_not_found().await.expect("query"));
    assert!(!article.is_article_displayed().await.expect("query"));

    session.close().await.expect("close");
}

#[tokio::test]
async fn local_storage_is_isolated_between_sessions() {
    let server = MockChromeServer::start().await.expect("mock chrome");

    let first = session_over(&server).await;
    let second = session_over(&server).await;

    let token = AuthToken::new("session-one-token");
    auth::inject_token(first.as_ref(), &token)
        .await
        .expect("inject");

    assert_eq!(
        auth::stored_token(first.as_ref()).await.expect("read"),
        Some(token)
    );
    assert_eq!(
        auth::stored_token(second.as_ref()).await.expect("read"),
        None
    );

    first.close().await.expect("close");
    second.close().await.expect("close");
}

#[tokio::test]
async fn token_lifecycle_in_browser_storage() {
    let server = MockChromeServer::start().await.expect("mock chrome");
    let session = session_over(&server).await;

    let token = AuthToken::new("tok-123");
    auth::inject_token(session.as_ref(), &token).await.expect("inject");
    assert_eq!(
        auth::stored_token(session.as_ref()).await.expect("read"),
        Some(token)
    );

    auth::clear_identity(session.as_ref()).await.expect("clear");
    assert_eq!(auth::stored_token(session.as_ref()).await.expect("read"), None);

    session.close().await.expect("close");
}

#[tokio::test]
async fn closed_session_refuses_further_work() {
    let server = MockChromeServer::start().await.expect("mock chrome");
    let session = session_over(&server).await;

    session.close().await.expect("close");
    session.close().await.expect("close is idempotent");

    assert!(session.navigate("http://localhost:3000/").await.is_err());
}

/// Session factory backed by the mock Chrome transport
struct WsSessionFactory {
    ws_endpoint: String,
}

#[async_trait::async_trait]
impl SessionFactory for WsSessionFactory {
    async fn create_session(
        &self,
    ) -> Result<Arc<dyn BrowserSession>, conduit_probe::Error> {
        let connection = CdpWebSocketConnection::connect(&self.ws_endpoint).await?;
        let client: Arc<dyn CdpClient> = Arc::new(CdpClientImpl::new(connection));
        let target = TargetHandle {
            target_id: "target-0".to_string(),
            browser_context_id: "context-0".to_string(),
            client,
        };
        let browser: Arc<dyn CdpBrowser> = Arc::new(MockCdpBrowser::new());
        Ok(Arc::new(BrowserSessionImpl::new(target, browser)))
    }
}

#[tokio::test]
async fn lifecycle_runs_page_flow_end_to_end() {
    let server = MockChromeServer::start().await.expect("mock chrome");

    let config = Config {
        base_url: BASE_URL.to_string(),
        wait_timeout_ms: 2000,
        poll_interval_ms: 25,
        ..Default::default()
    };

    let factory = Arc::new(WsSessionFactory {
        ws_endpoint: server.ws_endpoint().to_string(),
    });
    let reporter: Arc<dyn Reporter> = Arc::new(NullReporter);
    let lifecycle = TestLifecycle::new(config, factory, reporter);

    let outcome = lifecycle
        .run_test("article_not_found_flow", |ctx| async move {
            let article = ctx.article_page();
            let state = article.open("nonexistent-article-123").await?;
            assert_eq!(state, PageState::NotFound);
            Ok(())
        })
        .await;

    assert!(outcome.passed(), "outcome: {:?}", outcome.status);
}
