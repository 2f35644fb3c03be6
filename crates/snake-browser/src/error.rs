//! Browser automation error types.

use std::time::Duration;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("page evaluation failed: {0}")]
    Evaluation(String),

    #[error("timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("devtools error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl BrowserError {
    pub(crate) fn timeout(what: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
