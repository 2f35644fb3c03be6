//! The Chrome-backed [`BrowserPage`], one `chromiumoxide` tab each.

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{BrowserError, Result};
use crate::page::{BrowserPage, ElementInfo};
use crate::wait::{WaitPolicy, wait_for_function};

/// Named keys the suite may press.
pub const SUPPORTED_KEYS: &[&str] = &[
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "Enter",
    "Escape",
    "Tab",
    "Space",
];

/// A Chrome tab.
pub struct CdpPage {
    page: Page,
    navigation_timeout: Duration,
}

impl CdpPage {
    pub fn new(page: Page, navigation_timeout: Duration) -> Self {
        Self {
            page,
            navigation_timeout,
        }
    }
}

#[async_trait]
impl BrowserPage for CdpPage {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "goto");
        match timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: err.to_string(),
                });
            }
            Err(_) => {
                return Err(BrowserError::timeout(
                    format!("navigation to {url}"),
                    self.navigation_timeout,
                ));
            }
        }

        let policy = WaitPolicy::new(self.navigation_timeout, Duration::from_millis(50));
        wait_for_function(self, "document.readyState === 'complete'", &policy).await
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|err| BrowserError::Evaluation(err.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn query(&self, selector: &str) -> Result<Option<ElementInfo>> {
        let value = self.evaluate(&element_script(selector)?).await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| BrowserError::ElementNotFound {
                    selector: selector.to_string(),
                })?;
        element.click().await?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let key = key_name(key)?;
        debug!(key, "press");
        self.page.find_element("body").await?.press_key(key).await?;
        Ok(())
    }

    async fn wait_for_timeout(&self, duration: Duration) -> Result<()> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self.page.execute(params).await?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|err| BrowserError::Evaluation(format!("screenshot decode: {err}")))
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}

/// Key name as Chrome's key table spells it.
fn key_name(key: &str) -> Result<&'static str> {
    let name = SUPPORTED_KEYS
        .iter()
        .find(|supported| **supported == key)
        .ok_or_else(|| BrowserError::UnknownKey(key.to_string()))?;
    Ok(if *name == "Space" { " " } else { *name })
}

fn element_script(selector: &str) -> Result<String> {
    let selector = serde_json::to_string(selector)?;
    Ok(format!(
        "(() => {{
  const el = document.querySelector({selector});
  if (!el) return null;
  const rect = el.getBoundingClientRect();
  const style = window.getComputedStyle(el);
  return {{
    visible: rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden',
    enabled: !el.disabled,
    text: el.textContent,
  }};
}})()"
    ))
}
