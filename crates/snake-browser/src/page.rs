//! The page seam shared by the Chrome runtime and in-process doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// Point-in-time view of a single element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub visible: bool,
    pub enabled: bool,
    #[serde(default)]
    pub text: Option<String>,
}

/// A single browser tab.
///
/// Every method performs one round trip against the page and never retries;
/// waiting and retrying live in [`crate::wait`] and [`crate::locator`].
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn title(&self) -> Result<String>;

    /// Evaluate a JavaScript expression and return its JSON value.
    async fn evaluate(&self, expression: &str) -> Result<Value>;

    /// Look up the first element matching a CSS selector.
    async fn query(&self, selector: &str) -> Result<Option<ElementInfo>>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Press and release a named key such as `ArrowLeft`.
    async fn press_key(&self, key: &str) -> Result<()>;

    async fn wait_for_timeout(&self, duration: Duration) -> Result<()>;

    /// Capture the viewport as PNG bytes.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    async fn close(&self) -> Result<()>;
}

/// Hands out isolated pages, one per scenario.
#[async_trait]
pub trait PageFactory: Send + Sync {
    async fn new_page(&self) -> Result<Arc<dyn BrowserPage>>;
}
