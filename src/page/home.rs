//! Home page (global feed, tag sidebar, banner)

use crate::element::{ElementHandle, Locator};
use crate::page::object::{PageObject, PageState};
use crate::session::traits::BrowserSession;
use crate::wait::WaitEngine;
use crate::Result;
use std::sync::Arc;

/// Page object for the home screen
#[derive(Debug, Clone)]
pub struct HomePage {
    page: PageObject,
}

impl HomePage {
    /// Bind the home page to a session
    pub fn new(session: Arc<dyn BrowserSession>, base_url: impl Into<String>, wait: WaitEngine) -> Self {
        Self {
            page: PageObject::new(session, base_url, Locator::css(".home-page"), wait),
        }
    }

    /// The shared page base
    pub fn page(&self) -> &PageObject {
        &self.page
    }

    fn banner(&self) -> ElementHandle {
        self.page.handle(Locator::css(".banner h1"))
    }

    fn sidebar(&self) -> ElementHandle {
        self.page.handle(Locator::css(".sidebar"))
    }

    fn tag_pills(&self) -> ElementHandle {
        self.page.handle(Locator::css(".tag-list .tag-pill"))
    }

    fn article_previews(&self) -> ElementHandle {
        self.page.handle(Locator::css(".article-preview"))
    }

    fn sign_in_link(&self) -> ElementHandle {
        self.page.handle(Locator::css("a[href='/login']"))
    }

    fn sign_up_link(&self) -> ElementHandle {
        self.page.handle(Locator::css("a[href='/register']"))
    }

    fn new_article_link(&self) -> ElementHandle {
        self.page.handle(Locator::css("a[href='/editor/new']"))
    }

    /// Navigate to the home screen and wait for it to settle
    pub async fn open(&self) -> Result<PageState> {
        self.page.open("/").await
    }

    /// Navigate to the home screen filtered by a tag
    pub async fn open_with_tag(&self, tag: &str) -> Result<PageState> {
        let path = format!("/?tag={}", urlencoding::encode(tag));
        self.page.open(&path).await
    }

    /// Banner headline text
    pub async fn banner_title(&self) -> Result<String> {
        self.banner().text().await
    }

    /// True when the tag sidebar is visible
    pub async fn is_sidebar_displayed(&self) -> Result<bool> {
        self.sidebar().is_displayed().await
    }

    /// Number of tag pills in the sidebar
    ///
    /// Waits for the sidebar container first so an async-loading tag list is
    /// never read half-rendered; an empty list is a valid answer.
    pub async fn tag_count(&self) -> Result<u64> {
        self.sidebar().wait_until_visible().await?;
        self.tag_pills().count().await
    }

    /// True when a sidebar pill with this tag text is present
    pub async fn has_tag(&self, tag: &str) -> Result<bool> {
        let xpath = format!(
            "//*[contains(@class, 'tag-pill') and contains(text(), '{}')]",
            tag
        );
        self.page.handle(Locator::xpath(xpath)).exists().await
    }

    /// Click a sidebar tag pill
    pub async fn click_tag(&self, tag: &str) -> Result<()> {
        let xpath = format!(
            "//*[contains(@class, 'tag-pill') and contains(text(), '{}')]",
            tag
        );
        self.page.handle(Locator::xpath(xpath)).click().await
    }

    /// Number of article previews in the current feed
    pub async fn article_preview_count(&self) -> Result<u64> {
        self.article_previews().count().await
    }

    /// Block until the preview list differs from `previous` entries
    pub async fn wait_for_feed_change(&self, previous: u64) -> Result<()> {
        self.page
            .wait_for_state_change("feed re-rendered", || async {
                Ok(self.article_preview_count().await? != previous)
            })
            .await
    }

    /// True when the anonymous-user sign-in link is shown
    pub async fn is_sign_in_visible(&self) -> Result<bool> {
        self.sign_in_link().is_displayed().await
    }

    /// True when the anonymous-user sign-up link is shown
    pub async fn is_sign_up_visible(&self) -> Result<bool> {
        self.sign_up_link().is_displayed().await
    }

    /// True when the authenticated-user editor link is shown
    pub async fn is_new_article_visible(&self) -> Result<bool> {
        self.new_article_link().is_displayed().await
    }
}
