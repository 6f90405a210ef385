//! Article detail page

use crate::element::{ElementHandle, Locator};
use crate::page::object::{PageObject, PageState};
use crate::session::traits::BrowserSession;
use crate::wait::WaitEngine;
use crate::Result;
use std::sync::Arc;

/// Page object for the article detail screen
#[derive(Debug, Clone)]
pub struct ArticlePage {
    page: PageObject,
}

impl ArticlePage {
    /// Bind the article page to a session
    pub fn new(session: Arc<dyn BrowserSession>, base_url: impl Into<String>, wait: WaitEngine) -> Self {
        Self {
            page: PageObject::new(session, base_url, Locator::css("h1"), wait),
        }
    }

    /// The shared page base
    pub fn page(&self) -> &PageObject {
        &self.page
    }

    fn title(&self) -> ElementHandle {
        self.page.handle(Locator::css("h1"))
    }

    fn body(&self) -> ElementHandle {
        self.page.handle(Locator::css(".article-content p"))
    }

    fn author(&self) -> ElementHandle {
        self.page.handle(Locator::css(".author"))
    }

    fn date(&self) -> ElementHandle {
        self.page.handle(Locator::css(".date"))
    }

    fn tags(&self) -> ElementHandle {
        self.page.handle(Locator::css(".tag-list .tag-pill"))
    }

    fn favorite_button(&self) -> ElementHandle {
        self.page.handle(Locator::css("button.btn-outline-primary"))
    }

    fn follow_button(&self) -> ElementHandle {
        self.page.handle(Locator::css("button.btn-outline-secondary"))
    }

    fn delete_button(&self) -> ElementHandle {
        self.page.handle(Locator::css("button.btn-outline-danger"))
    }

    fn edit_link(&self) -> ElementHandle {
        self.page.handle(Locator::css("a[href*='/editor/']"))
    }

    fn comment_textarea(&self) -> ElementHandle {
        self.page.handle(Locator::css(".comment-form textarea"))
    }

    fn post_comment_button(&self) -> ElementHandle {
        self.page
            .handle(Locator::css(".comment-form button[type='submit']"))
    }

    fn comments(&self) -> ElementHandle {
        self.page.handle(Locator::css(".card.comment"))
    }

    /// Navigate to the article with the given slug and wait for it to settle
    ///
    /// A dead slug settles on [`PageState::NotFound`]; that is the answer,
    /// not a failure.
    pub async fn open(&self, slug: &str) -> Result<PageState> {
        let path = format!("/article/{}", urlencoding::encode(slug));
        self.page.open(&path).await
    }

    /// True when the article content is visible
    pub async fn is_article_displayed(&self) -> Result<bool> {
        Ok(self.title().is_displayed().await?
            && self
                .page
                .handle(Locator::css(".article-meta"))
                .is_displayed()
                .await?)
    }

    /// True when the page settled on its not-found state
    pub async fn is_page_not_found(&self) -> Result<bool> {
        self.page.is_page_not_found().await
    }

    /// Article title, waiting for it to render
    pub async fn article_title(&self) -> Result<String> {
        self.title().text().await
    }

    /// Article body text
    pub async fn article_body(&self) -> Result<String> {
        self.body().text().await
    }

    /// Author name as shown in the meta block
    pub async fn author_name(&self) -> Result<String> {
        self.author().text().await
    }

    /// Publication date as shown in the meta block
    pub async fn article_date(&self) -> Result<String> {
        self.date().text().await
    }

    /// Number of tag pills currently rendered
    pub async fn tag_count(&self) -> Result<u64> {
        self.tags().count().await
    }

    /// True when a pill with exactly this tag text is present
    pub async fn has_tag(&self, tag: &str) -> Result<bool> {
        let xpath = format!(
            "//*[contains(@class, 'tag-pill') and contains(text(), '{}')]",
            tag
        );
        self.page.handle(Locator::xpath(xpath)).exists().await
    }

    /// The count rendered on the favorite button
    pub async fn favorite_count(&self) -> Result<u64> {
        let text = self.favorite_button().text().await?;
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        Ok(digits.parse().unwrap_or(0))
    }

    /// Click the favorite toggle
    ///
    /// The click triggers a backend call; pair it with
    /// [`ArticlePage::wait_for_favorite_count_change`] before reading the
    /// count back.
    pub async fn click_favorite(&self) -> Result<()> {
        self.favorite_button().click().await
    }

    /// Block until the favorite count differs from `previous`
    pub async fn wait_for_favorite_count_change(&self, previous: u64) -> Result<()> {
        self.page
            .wait_for_state_change("favorite count changed", || async {
                Ok(self.favorite_count().await? != previous)
            })
            .await
    }

    /// Click the follow toggle
    pub async fn click_follow(&self) -> Result<()> {
        self.follow_button().click().await
    }

    /// Block until the follow button text satisfies `predicate`
    pub async fn wait_for_follow_state(&self, contains: &str) -> Result<()> {
        let expected = contains.to_string();
        self.page
            .wait_for_state_change("follow button updated", move || {
                let expected = expected.clone();
                async move { Ok(self.follow_button().text().await?.contains(&expected)) }
            })
            .await
    }

    /// True when the edit link is visible (author-only affordance)
    pub async fn is_edit_visible(&self) -> Result<bool> {
        self.edit_link().is_displayed().await
    }

    /// True when the delete button is visible (author-only affordance)
    pub async fn is_delete_visible(&self) -> Result<bool> {
        self.delete_button().is_displayed().await
    }

    /// Write and submit a comment
    pub async fn add_comment(&self, text: &str) -> Result<()> {
        self.comment_textarea().type_text(text).await?;
        self.post_comment_button().click().await
    }

    /// Number of comment cards currently rendered
    pub async fn comment_count(&self) -> Result<u64> {
        self.comments().count().await
    }

    /// Block until the comment count differs from `previous`
    pub async fn wait_for_comment_count_change(&self, previous: u64) -> Result<()> {
        self.page
            .wait_for_state_change("comment count changed", || async {
                Ok(self.comment_count().await? != previous)
            })
            .await
    }
}
