//! Per-test browser session management
//!
//! One [`BrowserSession`] per test, exclusively owned, never shared.
//! Sessions are created through a [`SessionFactory`] so the lifecycle layer
//! does not care whether the backing driver is a real browser or a mock.
//!
//! ## Module structure
//! - `traits`: the session and factory seams
//! - `browser`: CDP-backed session (isolated browser context per session)
//! - `auth`: browser-side authenticated-identity helpers
//! - `mock`: in-memory session model for tests

pub mod traits;
pub mod browser;
pub mod auth;
pub mod mock;

pub use auth::AuthToken;
pub use browser::{BrowserSessionImpl, CdpSessionFactory};
pub use mock::{MockBrowserSession, MockSessionFactory};
pub use traits::{BrowserSession, SessionFactory};
