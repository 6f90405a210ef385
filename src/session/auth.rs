//! Browser-side authenticated identity
//!
//! The frontend keeps its JWT in local storage under `jwtToken`; injecting a
//! token there and reloading is how tests establish a logged-in browser
//! without driving the login form, and clearing it is how they simulate an
//! expired or discarded credential.

use crate::session::traits::BrowserSession;
use crate::Result;

/// Local-storage key the frontend reads its JWT from
pub const TOKEN_STORAGE_KEY: &str = "jwtToken";

/// An opaque credential obtained from a login call
///
/// Owned either by the browser session (via local storage) or by an
/// [`crate::api::ApiClient`] (in memory); never persisted beyond the test
/// process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token value
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// The raw token value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A structurally-broken variant of this token, for invalid-credential tests
    pub fn corrupted(&self) -> AuthToken {
        // Reversing the payload keeps the length plausible while breaking
        // both signature and structure.
        AuthToken(self.0.chars().rev().collect())
    }
}

impl std::fmt::Display for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens are credentials; never print the value
        write!(f, "AuthToken(***)")
    }
}

/// Store a token in the session's local storage under the frontend's key
pub async fn inject_token(session: &dyn BrowserSession, token: &AuthToken) -> Result<()> {
    session
        .local_storage_set(TOKEN_STORAGE_KEY, token.as_str())
        .await
}

/// Read the token the frontend currently holds, if any
pub async fn stored_token(session: &dyn BrowserSession) -> Result<Option<AuthToken>> {
    Ok(session
        .local_storage_get(TOKEN_STORAGE_KEY)
        .await?
        .map(AuthToken::new))
}

/// Drop the browser-side identity
pub async fn clear_identity(session: &dyn BrowserSession) -> Result<()> {
    session.local_storage_remove(TOKEN_STORAGE_KEY).await
}
