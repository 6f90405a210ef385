//! Sign-in page

use crate::element::{ElementHandle, Locator};
use crate::page::object::{PageObject, PageState};
use crate::session::traits::BrowserSession;
use crate::wait::WaitEngine;
use crate::Result;
use std::sync::Arc;

const LOGIN_PATH: &str = "/user/login";

/// Page object for the sign-in screen
#[derive(Debug, Clone)]
pub struct LoginPage {
    page: PageObject,
}

impl LoginPage {
    /// Bind the login page to a session
    pub fn new(session: Arc<dyn BrowserSession>, base_url: impl Into<String>, wait: WaitEngine) -> Self {
        Self {
            page: PageObject::new(session, base_url, Locator::css("h1.text-xs-center"), wait),
        }
    }

    /// The shared page base
    pub fn page(&self) -> &PageObject {
        &self.page
    }

    fn email_input(&self) -> ElementHandle {
        self.page.handle(Locator::css("input[placeholder='Email']"))
    }

    fn password_input(&self) -> ElementHandle {
        self.page.handle(Locator::css("input[placeholder='Password']"))
    }

    fn sign_in_button(&self) -> ElementHandle {
        self.page.handle(Locator::css("button[type='submit']"))
    }

    fn error_messages(&self) -> ElementHandle {
        self.page.handle(Locator::css("ul.error-messages li"))
    }

    /// Navigate to the sign-in screen and wait for it to settle
    pub async fn open(&self) -> Result<PageState> {
        self.page.open(LOGIN_PATH).await
    }

    /// Fill the email field
    pub async fn enter_email(&self, email: &str) -> Result<()> {
        self.email_input().type_text(email).await
    }

    /// Fill the password field
    pub async fn enter_password(&self, password: &str) -> Result<()> {
        self.password_input().type_text(password).await
    }

    /// Submit the form
    pub async fn click_sign_in(&self) -> Result<()> {
        self.sign_in_button().click().await
    }

    /// Fill both fields and submit
    ///
    /// Returns as soon as the form is submitted; callers decide whether to
    /// wait for the redirect ([`LoginPage::wait_until_signed_in`]) or for a
    /// rejection banner, because both are legitimate outcomes under test.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.click_sign_in().await
    }

    /// Block until the app has navigated away from the login route
    pub async fn wait_until_signed_in(&self) -> Result<()> {
        self.page
            .wait_for_state_change("left the login route", || async {
                Ok(!self.page.current_url().await?.contains(LOGIN_PATH))
            })
            .await
    }

    /// True when a validation/rejection banner is visible
    pub async fn is_error_displayed(&self) -> Result<bool> {
        self.error_messages().is_displayed().await
    }

    /// Text of the first visible error message
    pub async fn error_text(&self) -> Result<String> {
        self.error_messages().text().await
    }
}
