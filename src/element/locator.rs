//! Locator strategies
//!
//! A locator is a recipe for finding a control, not a reference to one.
//! Selector values are embedded into scripts as JSON string literals so
//! quoting and escaping are never hand-rolled.

use serde::{Deserialize, Serialize};

/// How to find an element in the live DOM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// Visible text content (substring match)
    Text(String),
}

impl Locator {
    /// CSS selector locator
    pub fn css<S: Into<String>>(selector: S) -> Self {
        Locator::Css(selector.into())
    }

    /// XPath locator
    pub fn xpath<S: Into<String>>(expression: S) -> Self {
        Locator::XPath(expression.into())
    }

    /// Text-content locator
    pub fn text<S: Into<String>>(text: S) -> Self {
        Locator::Text(text.into())
    }

    /// The raw selector value
    pub fn value(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) | Locator::Text(s) => s,
        }
    }

    /// JS expression evaluating to the first matching element or null
    pub fn element_expr(&self) -> String {
        match self {
            Locator::Css(selector) => {
                format!("document.querySelector({})", serde_json::json!(selector))
            }
            Locator::XPath(xpath) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                serde_json::json!(xpath)
            ),
            Locator::Text(text) => format!(
                r#"(() => {{
                    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT, {{
                        acceptNode: (node) => node.textContent.includes({text})
                            ? NodeFilter.FILTER_ACCEPT : NodeFilter.FILTER_REJECT
                    }});
                    const node = walker.nextNode();
                    return node ? node.parentElement : null;
                }})()"#,
                text = serde_json::json!(text)
            ),
        }
    }

    /// JS expression evaluating to the number of matching elements
    pub fn count_expr(&self) -> String {
        match self {
            Locator::Css(selector) => format!(
                "document.querySelectorAll({}).length",
                serde_json::json!(selector)
            ),
            Locator::XPath(xpath) => format!(
                "document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
                serde_json::json!(xpath)
            ),
            Locator::Text(text) => format!(
                r#"(() => {{
                    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT, {{
                        acceptNode: (node) => node.textContent.includes({text})
                            ? NodeFilter.FILTER_ACCEPT : NodeFilter.FILTER_REJECT
                    }});
                    let count = 0;
                    while (walker.nextNode()) count++;
                    return count;
                }})()"#,
                text = serde_json::json!(text)
            ),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
            Locator::Text(s) => write!(f, "text={}", s),
        }
    }
}
