//! Common test utilities
//!
//! Hosts a stub Conduit backend: a minimal HTTP/1.1 responder over a raw
//! TCP listener serving canned RealWorld API behavior (login, favorites,
//! pagination, auth rejection). Enough surface for the ApiClient contract
//! tests without a deployed backend.

use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Token the stub issues for the seeded user
pub const VALID_TOKEN: &str = "stub-jwt-for-john";
/// Seeded user credentials
pub const USER_EMAIL: &str = "john@example.com";
pub const USER_PASSWORD: &str = "password123";
/// Slug the stub knows about
pub const KNOWN_SLUG: &str = "welcome-to-realworld";

const ARTICLE_COUNT: usize = 3;

/// One parsed request
struct HttpRequest {
    method: String,
    path: String,
    authorization: Option<String>,
    body: String,
}

/// Stub Conduit API server
pub struct MockApiServer {
    base_url: String,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockApiServer {
    /// Start the stub server on an ephemeral port
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url = format!("http://{}/api", addr);

        let favorited: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _peer)) => {
                                let favorited = Arc::clone(&favorited);
                                tokio::spawn(Self::handle_connection(stream, favorited));
                            }
                            Err(_) => break,
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Ok(Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Base URL including the /api prefix
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_connection(mut stream: TcpStream, favorited: Arc<Mutex<HashSet<String>>>) {
        let request = match Self::read_request(&mut stream).await {
            Some(request) => request,
            None => return,
        };

        let (status, body) = Self::route(&request, &favorited).await;
        let payload = body.to_string();
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason(status),
            payload.len(),
            payload
        );

        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    async fn read_request(stream: &mut TcpStream) -> Option<HttpRequest> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];

        // Read until the header terminator, then drain the declared body
        let header_end = loop {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                return None;
            }
            buffer.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find_header_end(&buffer) {
                break pos;
            }
            if buffer.len() > 64 * 1024 {
                return None;
            }
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let mut lines = head.lines();
        let request_line = lines.next()?;
        let mut parts = request_line.split_whitespace();
        let method = parts.next()?.to_string();
        let path = parts.next()?.to_string();

        let mut authorization = None;
        let mut content_length = 0usize;
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                match name.trim().to_ascii_lowercase().as_str() {
                    "authorization" => authorization = Some(value.trim().to_string()),
                    "content-length" => content_length = value.trim().parse().unwrap_or(0),
                    _ => {}
                }
            }
        }

        let mut body_bytes = buffer[header_end + 4..].to_vec();
        while body_bytes.len() < content_length {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            body_bytes.extend_from_slice(&chunk[..n]);
        }
        body_bytes.truncate(content_length);

        Some(HttpRequest {
            method,
            path,
            authorization,
            body: String::from_utf8_lossy(&body_bytes).to_string(),
        })
    }

    fn is_authenticated(request: &HttpRequest) -> bool {
        request.authorization.as_deref() == Some(&format!("Token {}", VALID_TOKEN))
    }

    async fn route(request: &HttpRequest, favorited: &Mutex<HashSet<String>>) -> (u16, Value) {
        let path = request.path.strip_prefix("/api").unwrap_or(&request.path);
        let (route, query) = match path.split_once('?') {
            Some((route, query)) => (route, query),
            None => (path, ""),
        };

        match (request.method.as_str(), route) {
            ("POST", "/users/login") => Self::login(&request.body),
            ("POST", "/users") => Self::register(&request.body),
            ("GET", "/user") => {
                if Self::is_authenticated(request) {
                    (200, json!({ "user": { "email": USER_EMAIL, "username": "john", "token": VALID_TOKEN } }))
                } else {
                    unauthorized()
                }
            }
            ("GET", "/articles") => Self::list_articles(query),
            ("GET", "/tags") => (200, json!({ "tags": ["welcome", "introduction"] })),
            _ => {
                if let Some(slug) = route
                    .strip_prefix("/articles/")
                    .and_then(|rest| rest.strip_suffix("/favorite"))
                {
                    return Self::favorite(request, slug, favorited).await;
                }
                if let Some(slug) = route.strip_prefix("/articles/") {
                    if request.method == "GET" && !slug.contains('/') {
                        return Self::article(slug, favorited).await;
                    }
                }
                (404, json!({ "errors": { "path": ["not handled"] } }))
            }
        }
    }

    fn login(body: &str) -> (u16, Value) {
        let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let email = parsed.pointer("/user/email").and_then(|v| v.as_str());
        let password = parsed.pointer("/user/password").and_then(|v| v.as_str());

        if email == Some(USER_EMAIL) && password == Some(USER_PASSWORD) {
            (
                200,
                json!({ "user": { "email": USER_EMAIL, "username": "john", "token": VALID_TOKEN } }),
            )
        } else {
            (422, json!({ "errors": { "email or password": ["is invalid"] } }))
        }
    }

    fn register(body: &str) -> (u16, Value) {
        let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        match parsed.pointer("/user/username").and_then(|v| v.as_str()) {
            Some(username) if !username.is_empty() => (
                201,
                json!({ "user": { "username": username, "token": "stub-jwt-for-new-user" } }),
            ),
            _ => (422, json!({ "errors": { "username": ["can't be blank"] } })),
        }
    }

    fn list_articles(query: &str) -> (u16, Value) {
        let mut offset = 0usize;
        let mut limit = 20usize;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("offset", value)) => offset = value.parse().unwrap_or(0),
                Some(("limit", value)) => limit = value.parse().unwrap_or(20),
                _ => {}
            }
        }

        let articles: Vec<Value> = (0..ARTICLE_COUNT)
            .skip(offset)
            .take(limit)
            .map(|i| json!({ "slug": format!("article-{}", i), "title": format!("Article {}", i) }))
            .collect();

        (
            200,
            json!({ "articles": articles, "articlesCount": ARTICLE_COUNT }),
        )
    }

    async fn article(slug: &str, favorited: &Mutex<HashSet<String>>) -> (u16, Value) {
        if slug != KNOWN_SLUG {
            return (404, json!({ "errors": { "article": ["not found"] } }));
        }

        let is_favorited = favorited.lock().await.contains(slug);
        (
            200,
            json!({ "article": { "slug": slug, "title": "Welcome to RealWorld", "favorited": is_favorited } }),
        )
    }

    async fn favorite(
        request: &HttpRequest,
        slug: &str,
        favorited: &Mutex<HashSet<String>>,
    ) -> (u16, Value) {
        if !Self::is_authenticated(request) {
            return unauthorized();
        }
        if slug != KNOWN_SLUG {
            return (404, json!({ "errors": { "article": ["not found"] } }));
        }

        let mut set = favorited.lock().await;
        match request.method.as_str() {
            "POST" => {
                set.insert(slug.to_string());
                (
                    200,
                    json!({ "article": { "slug": slug, "favorited": true } }),
                )
            }
            "DELETE" => {
                if set.remove(slug) {
                    (
                        200,
                        json!({ "article": { "slug": slug, "favorited": false } }),
                    )
                } else {
                    // Already unfavorited: a validation outcome, never a 500
                    (422, json!({ "errors": { "article": ["not favorited"] } }))
                }
            }
            _ => (404, json!({ "errors": { "path": ["not handled"] } })),
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn unauthorized() -> (u16, Value) {
    (401, json!({ "errors": { "authorization": ["is required"] } }))
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        401 => "Unauthorized",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        _ => "Unknown",
    }
}
