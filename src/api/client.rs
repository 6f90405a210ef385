//! Authenticated API test client
//!
//! Issues raw HTTP calls against the backend and keeps at most one piece of
//! state: the current bearer token. Every call is safe to repeat; whether
//! the server's behavior is idempotent is exactly what test bodies assert.

use crate::api::response::ApiResponse;
use crate::session::auth::AuthToken;
use crate::{Error, Result};
use serde_json::{json, Value};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info};

/// How a request should be authenticated
#[derive(Debug, Clone)]
pub enum Auth {
    /// No Authorization header
    None,
    /// The client's stored token; proceeds unauthenticated when none is
    /// stored, so missing-credential flows are testable deliberately
    Stored,
    /// An explicit token value, without touching the stored one; lets tests
    /// send malformed/expired/corrupted credentials
    Token(String),
}

/// Direct HTTP client for the backend API
pub struct ApiClient {
    api_url: String,
    http: reqwest::Client,
    token: RwLock<Option<AuthToken>>,
}

impl ApiClient {
    /// Create a client for a backend base URL with the default bounded timeout
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_url, Duration::from_secs(15))
    }

    /// Create a client with a custom request timeout
    ///
    /// Calls either complete, fail, or hit this deadline; there is no
    /// background execution and no cancellation mid-call.
    pub fn with_timeout(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            http,
            token: RwLock::new(None),
        })
    }

    /// The stored token, if any
    pub fn token(&self) -> Option<AuthToken> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    /// Replace the stored token
    pub fn set_token(&self, token: AuthToken) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
    }

    /// Discard the stored token
    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }

    /// Authenticate and store the resulting token
    ///
    /// A rejected login is a failed harness precondition here, not a result;
    /// tests probing bad credentials should call [`ApiClient::post`] on the
    /// login endpoint directly and assert on the response.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken> {
        info!("API login as {}", email);

        let body = json!({ "user": { "email": email, "password": password } });
        let response = self.post("/users/login", Some(&body), Auth::None).await?;

        if !response.is_success() {
            return Err(Error::internal(format!(
                "login as {} returned status {}",
                email, response.status
            )));
        }

        let token = response
            .string_field("/user/token")
            .map(AuthToken::new)
            .ok_or_else(|| Error::internal("login response carried no token"))?;

        self.set_token(token.clone());
        Ok(token)
    }

    /// Register a new user; the response is data either way
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<ApiResponse> {
        let body = json!({
            "user": { "username": username, "email": email, "password": password }
        });
        self.post("/users", Some(&body), Auth::None).await
    }

    /// The currently-authenticated user
    pub async fn current_user(&self, auth: Auth) -> Result<ApiResponse> {
        self.get("/user", auth).await
    }

    /// GET a path
    pub async fn get(&self, path: &str, auth: Auth) -> Result<ApiResponse> {
        self.request(reqwest::Method::GET, path, None, auth).await
    }

    /// POST a path with an optional JSON body
    pub async fn post(&self, path: &str, body: Option<&Value>, auth: Auth) -> Result<ApiResponse> {
        self.request(reqwest::Method::POST, path, body, auth).await
    }

    /// PUT a path with an optional JSON body
    pub async fn put(&self, path: &str, body: Option<&Value>, auth: Auth) -> Result<ApiResponse> {
        self.request(reqwest::Method::PUT, path, body, auth).await
    }

    /// DELETE a path
    pub async fn delete(&self, path: &str, auth: Auth) -> Result<ApiResponse> {
        self.request(reqwest::Method::DELETE, path, None, auth).await
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
        auth: Auth,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.api_url, path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);

        if let Some(header) = self.auth_header_value(&auth) {
            request = request.header("Authorization", header);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        // Transport failures surface as harness errors; any HTTP status,
        // including 5xx, comes back as data.
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("{} -> {} ({} bytes)", url, status, body.len());
        Ok(ApiResponse::new(status, body))
    }

    /// The Authorization header for a request, if one applies
    fn auth_header_value(&self, auth: &Auth) -> Option<String> {
        match auth {
            Auth::None => None,
            Auth::Stored => self.token().map(|t| format!("Token {}", t.as_str())),
            Auth::Token(value) => Some(format!("Token {}", value)),
        }
    }

    // --- Conduit endpoint wrappers -------------------------------------

    /// Fetch an article by slug
    pub async fn get_article(&self, slug: &str, auth: Auth) -> Result<ApiResponse> {
        self.get(&article_path(slug), auth).await
    }

    /// Create an article
    pub async fn create_article(
        &self,
        title: &str,
        description: &str,
        body: &str,
        tags: &[&str],
        auth: Auth,
    ) -> Result<ApiResponse> {
        let payload = json!({
            "article": {
                "title": title,
                "description": description,
                "body": body,
                "tagList": tags,
            }
        });
        self.post("/articles", Some(&payload), auth).await
    }

    /// Update an article's fields
    pub async fn update_article(
        &self,
        slug: &str,
        title: Option<&str>,
        description: Option<&str>,
        body: Option<&str>,
        auth: Auth,
    ) -> Result<ApiResponse> {
        let mut article = serde_json::Map::new();
        if let Some(title) = title {
            article.insert("title".into(), json!(title));
        }
        if let Some(description) = description {
            article.insert("description".into(), json!(description));
        }
        if let Some(body) = body {
            article.insert("body".into(), json!(body));
        }

        let payload = json!({ "article": article });
        self.put(&article_path(slug), Some(&payload), auth).await
    }

    /// Delete an article
    pub async fn delete_article(&self, slug: &str, auth: Auth) -> Result<ApiResponse> {
        self.delete(&article_path(slug), auth).await
    }

    /// Favorite an article
    pub async fn favorite_article(&self, slug: &str, auth: Auth) -> Result<ApiResponse> {
        self.post(&favorite_path(slug), None, auth).await
    }

    /// Unfavorite an article; repeating the call is always safe client-side
    pub async fn unfavorite_article(&self, slug: &str, auth: Auth) -> Result<ApiResponse> {
        self.delete(&favorite_path(slug), auth).await
    }

    /// Comments of an article
    pub async fn get_comments(&self, slug: &str, auth: Auth) -> Result<ApiResponse> {
        self.get(&format!("{}/comments", article_path(slug)), auth).await
    }

    /// Add a comment to an article
    pub async fn add_comment(&self, slug: &str, body: &str, auth: Auth) -> Result<ApiResponse> {
        let payload = json!({ "comment": { "body": body } });
        self.post(&format!("{}/comments", article_path(slug)), Some(&payload), auth)
            .await
    }

    /// Delete a comment
    pub async fn delete_comment(&self, slug: &str, comment_id: &str, auth: Auth) -> Result<ApiResponse> {
        self.delete(
            &format!(
                "{}/comments/{}",
                article_path(slug),
                urlencoding::encode(comment_id)
            ),
            auth,
        )
        .await
    }

    /// Follow a user
    pub async fn follow_user(&self, username: &str, auth: Auth) -> Result<ApiResponse> {
        self.post(&follow_path(username), None, auth).await
    }

    /// Unfollow a user
    pub async fn unfollow_user(&self, username: &str, auth: Auth) -> Result<ApiResponse> {
        self.delete(&follow_path(username), auth).await
    }

    /// List articles with offset/limit pagination
    pub async fn list_articles(&self, offset: u32, limit: u32, auth: Auth) -> Result<ApiResponse> {
        self.get(&format!("/articles?offset={}&limit={}", offset, limit), auth)
            .await
    }

    /// The personal feed with offset/limit pagination
    pub async fn feed(&self, offset: u32, limit: u32, auth: Auth) -> Result<ApiResponse> {
        self.get(&format!("/articles/feed?offset={}&limit={}", offset, limit), auth)
            .await
    }

    /// All known tags
    pub async fn tags(&self) -> Result<ApiResponse> {
        self.get("/tags", Auth::None).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.api_url)
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

fn article_path(slug: &str) -> String {
    format!("/articles/{}", urlencoding::encode(slug))
}

fn favorite_path(slug: &str) -> String {
    format!("/articles/{}/favorite", urlencoding::encode(slug))
}

fn follow_path(username: &str) -> String {
    format!("/profiles/{}/follow", urlencoding::encode(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_encode_slugs() {
        assert_eq!(
            article_path("welcome-to-realworld"),
            "/articles/welcome-to-realworld"
        );
        assert_eq!(
            favorite_path("spaced slug"),
            "/articles/spaced%20slug/favorite"
        );
        assert_eq!(follow_path("john"), "/profiles/john/follow");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.api_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_auth_header_selection() {
        let client = ApiClient::new("http://localhost:8080/api").unwrap();

        // No stored token: Stored proceeds unauthenticated instead of failing
        assert_eq!(client.auth_header_value(&Auth::None), None);
        assert_eq!(client.auth_header_value(&Auth::Stored), None);

        client.set_token(AuthToken::new("abc123"));
        assert_eq!(
            client.auth_header_value(&Auth::Stored).as_deref(),
            Some("Token abc123")
        );

        // Explicit token wins without touching stored state
        assert_eq!(
            client
                .auth_header_value(&Auth::Token("other".to_string()))
                .as_deref(),
            Some("Token other")
        );
        assert_eq!(client.token().unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_clear_token() {
        let client = ApiClient::new("http://localhost:8080/api").unwrap();
        client.set_token(AuthToken::new("abc"));
        client.clear_token();
        assert!(client.token().is_none());
        assert_eq!(client.auth_header_value(&Auth::Stored), None);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Nothing listens on port 1; this is an ApiError, not a status
        let client = ApiClient::with_timeout("http://127.0.0.1:1/api", Duration::from_millis(500))
            .unwrap();
        let err = client.get("/articles", Auth::None).await.unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }
}
