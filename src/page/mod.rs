//! Page objects
//!
//! One type per logical screen, exposing semantic operations instead of raw
//! selectors. The base [`PageObject`] owns the navigation-and-synchronize
//! protocol: control never returns to a test body before the page's defining
//! condition holds, and a missing resource is a queryable terminal state
//! rather than an exception.
//!
//! ## Module structure
//! - `object`: the shared base and the [`PageState`] machine
//! - `home`, `login`, `article`: concrete screens of the application under test

pub mod object;
pub mod home;
pub mod login;
pub mod article;

pub use article::ArticlePage;
pub use home::HomePage;
pub use login::LoginPage;
pub use object::{PageObject, PageState};
