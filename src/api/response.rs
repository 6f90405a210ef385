//! Normalized API response envelope

use serde_json::Value;

/// Result of one HTTP call, immutable once constructed
///
/// Non-2xx statuses are legitimate outcomes under test; constructing this
/// envelope is the last thing the client does with a response, and nothing
/// here can fail or throw.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Wrap a status and body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, if it is any
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Look up a value by JSON pointer (e.g. "/user/token")
    pub fn field(&self, pointer: &str) -> Option<Value> {
        self.json()?.pointer(pointer).cloned()
    }

    /// A string field by JSON pointer
    pub fn string_field(&self, pointer: &str) -> Option<String> {
        self.field(pointer)?.as_str().map(|s| s.to_string())
    }

    /// A boolean field by JSON pointer (e.g. "/article/favorited")
    pub fn bool_field(&self, pointer: &str) -> Option<bool> {
        self.field(pointer)?.as_bool()
    }

    /// Flattened validation messages from the backend's errors envelope
    ///
    /// The API reports 422s as `{"errors": {"field": ["msg", ...], ...}}`.
    pub fn error_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();

        if let Some(Value::Object(errors)) = self.field("/errors") {
            for (field, value) in errors {
                match value {
                    Value::Array(items) => {
                        for item in items {
                            if let Some(text) = item.as_str() {
                                messages.push(format!("{} {}", field, text));
                            }
                        }
                    }
                    Value::String(text) => messages.push(format!("{} {}", field, text)),
                    _ => {}
                }
            }
        }

        messages
    }

    /// True when the body leaks implementation internals
    ///
    /// Error bodies must not expose stack traces, filesystem paths,
    /// connection strings, or raw identifiers.
    pub fn contains_sensitive_info(&self) -> bool {
        let lower = self.body.to_lowercase();

        lower.contains("stacktrace")
            || lower.contains("exception")
            || lower.contains("at io.")
            || lower.contains("at java.")
            || lower.contains("/home/")
            || lower.contains("/usr/")
            || lower.contains("jdbc:")
            || lower.contains("password")
            || matches_pattern(
                "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}",
                &lower,
            )
    }

    /// True when the body contains an email address
    pub fn contains_email_address(&self) -> bool {
        matches_pattern(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}", &self.body)
    }
}

fn matches_pattern(pattern: &str, text: &str) -> bool {
    regex::Regex::new(pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}
