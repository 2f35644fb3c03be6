//! Selector-bound element handles with actionability waits and retrying
//! expectations.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{BrowserError, Result};
use crate::page::{BrowserPage, ElementInfo};
use crate::wait::{WaitPolicy, poll_until};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Attached,
    Visible,
    Hidden,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementState::Attached => write!(f, "attached"),
            ElementState::Visible => write!(f, "visible"),
            ElementState::Hidden => write!(f, "hidden"),
        }
    }
}

/// A condition checked by [`Locator::expect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Visible,
    Hidden,
    Enabled,
    Disabled,
    Text(String),
}

impl Condition {
    fn holds(&self, element: Option<&ElementInfo>) -> bool {
        match (self, element) {
            (Condition::Hidden, None) => true,
            (_, None) => false,
            (Condition::Visible, Some(el)) => el.visible,
            (Condition::Hidden, Some(el)) => !el.visible,
            (Condition::Enabled, Some(el)) => el.enabled,
            (Condition::Disabled, Some(el)) => !el.enabled,
            (Condition::Text(expected), Some(el)) => {
                el.text.as_deref().map(str::trim) == Some(expected.trim())
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Visible => write!(f, "visible"),
            Condition::Hidden => write!(f, "hidden"),
            Condition::Enabled => write!(f, "enabled"),
            Condition::Disabled => write!(f, "disabled"),
            Condition::Text(text) => write!(f, "text {:?}", text),
        }
    }
}

#[derive(Clone)]
pub struct Locator {
    page: Arc<dyn BrowserPage>,
    selector: String,
    policy: WaitPolicy,
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("selector", &self.selector)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Locator {
    pub fn new(page: Arc<dyn BrowserPage>, selector: impl Into<String>) -> Self {
        Self {
            page,
            selector: selector.into(),
            policy: WaitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Click once the element is attached, visible and enabled.
    pub async fn click(&self) -> Result<()> {
        let (page, selector) = self.parts();
        let what = format!("{} to be clickable", selector);
        let ready = poll_until(page, &self.policy, &what, move || async move {
            Ok(page
                .query(selector)
                .await?
                .filter(|el| el.visible && el.enabled)
                .map(|_| ()))
        })
        .await;
        if let Err(err) = ready {
            return Err(self.missing_or(err).await);
        }

        debug!(selector = %self.selector, "click");
        self.page.click(&self.selector).await
    }

    pub async fn text_content(&self) -> Result<Option<String>> {
        let (page, selector) = self.parts();
        let what = format!("{} to be attached", selector);
        let attached = poll_until(page, &self.policy, &what, move || async move {
            page.query(selector).await
        })
        .await;
        match attached {
            Ok(element) => Ok(element.text),
            Err(err) => Err(self.missing_or(err).await),
        }
    }

    /// Immediate check; a missing element is not visible.
    pub async fn is_visible(&self) -> Result<bool> {
        Ok(self
            .page
            .query(&self.selector)
            .await?
            .is_some_and(|el| el.visible))
    }

    pub async fn wait_for(&self, state: ElementState) -> Result<()> {
        let condition = match state {
            ElementState::Attached => None,
            ElementState::Visible => Some(Condition::Visible),
            ElementState::Hidden => Some(Condition::Hidden),
        };
        let (page, selector) = self.parts();
        let condition = condition.as_ref();
        let what = format!("{} to be {}", selector, state);
        poll_until(page, &self.policy, &what, move || async move {
            let element = page.query(selector).await?;
            let reached = match condition {
                None => element.is_some(),
                Some(condition) => condition.holds(element.as_ref()),
            };
            Ok(reached.then_some(()))
        })
        .await
    }

    /// Retry `condition` until it holds or the policy times out.
    pub async fn expect(&self, condition: Condition) -> Result<()> {
        let (page, selector) = self.parts();
        let what = format!("{} to be {}", selector, condition);
        let condition = &condition;
        let outcome = poll_until(page, &self.policy, &what, move || async move {
            let element = page.query(selector).await?;
            Ok(condition.holds(element.as_ref()).then_some(()))
        })
        .await;

        match outcome {
            Err(BrowserError::Timeout { timeout_ms, .. }) => {
                let last = page.query(selector).await?;
                Err(BrowserError::Timeout {
                    what: format!("{what} (last seen: {})", describe(last.as_ref())),
                    timeout_ms,
                })
            }
            other => other,
        }
    }

    fn parts(&self) -> (&dyn BrowserPage, &str) {
        (self.page.as_ref(), self.selector.as_str())
    }

    /// A timeout on an element that never attached becomes `ElementNotFound`;
    /// one that is present but not actionable keeps its timeout.
    async fn missing_or(&self, err: BrowserError) -> BrowserError {
        if !err.is_timeout() {
            return err;
        }
        match self.page.query(&self.selector).await {
            Ok(Some(_)) => err,
            Ok(None) => BrowserError::ElementNotFound {
                selector: format!("{} ({})", self.selector, err),
            },
            Err(query_err) => query_err,
        }
    }
}

/// Retry until the page title equals `expected`.
pub async fn expect_title(
    page: &dyn BrowserPage,
    expected: &str,
    policy: &WaitPolicy,
) -> Result<()> {
    let what = format!("title {:?}", expected);
    let outcome = poll_until(page, policy, &what, move || async move {
        Ok((page.title().await? == expected).then_some(()))
    })
    .await;

    match outcome {
        Err(BrowserError::Timeout { timeout_ms, .. }) => Err(BrowserError::Timeout {
            what: format!("{what} (last seen: {:?})", page.title().await?),
            timeout_ms,
        }),
        other => other,
    }
}

fn describe(element: Option<&ElementInfo>) -> String {
    match element {
        None => "not attached".to_string(),
        Some(el) => format!(
            "visible={}, enabled={}, text={:?}",
            el.visible,
            el.enabled,
            el.text.as_deref().unwrap_or("")
        ),
    }
}
