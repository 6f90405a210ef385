//! Chrome DevTools Protocol (CDP) layer
//!
//! WebSocket communication with a Chrome/Chromium instance: the generic
//! "remote browser control" seam the rest of the harness builds on. Any
//! CDP-compatible endpoint satisfies the traits defined here.
//!
//! ## Module structure
//! - `traits`: core trait definitions for connections, clients, and the
//!   browser-level handle
//! - `types`: CDP wire types
//! - `connection`: WebSocket connection implementation
//! - `client`: typed CDP client implementation
//! - `browser`: browser-level target and context management
//! - `mock`: mock implementations for testing

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod browser;
pub mod mock;

pub use traits::{
    CdpBrowser, CdpClient, CdpConnection, CdpResponse, EvaluationResult, NavigationResult,
    TargetHandle,
};

// Re-export implementation structs
pub use browser::CdpBrowserImpl;
pub use client::CdpClientImpl;
pub use connection::CdpWebSocketConnection;

// Re-export mocks for development/testing
pub use mock::{MockCdpBrowser, MockCdpClient};
