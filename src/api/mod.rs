//! Direct API testing
//!
//! [`ApiClient`] bypasses the UI and talks to the backend REST API,
//! normalizing every HTTP outcome into an [`ApiResponse`]. Error statuses
//! are data for assertions, never exceptions: several whole test families
//! exist only to pin down exact 401/404/422 behavior.
//!
//! ## Module structure
//! - `response`: the normalized response envelope
//! - `client`: the authenticated HTTP client and endpoint wrappers

pub mod response;
pub mod client;

pub use client::{ApiClient, Auth};
pub use response::ApiResponse;
