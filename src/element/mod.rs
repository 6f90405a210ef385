//! Element location and interaction
//!
//! [`Locator`] names a UI control; [`ElementHandle`] is the wait-guarded set
//! of operations on it. Handles never cache a DOM node: the locator is
//! re-resolved on every access because the application re-renders
//! asynchronously and any held node may already be detached.
//!
//! ## Module structure
//! - `locator`: selector strategies and their JS expressions
//! - `js`: per-operation script builders
//! - `handle`: the element handle itself

pub mod locator;
pub mod js;
pub mod handle;

pub use handle::{ElementHandle, ElementInfo};
pub use locator::Locator;
