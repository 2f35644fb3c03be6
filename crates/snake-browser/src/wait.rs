//! Bounded polling against a page.
//!
//! The budget is the sum of the poll intervals slept through
//! [`BrowserPage::wait_for_timeout`], so a page that simulates time sees the
//! same number of polls as a real browser.

use std::future::Future;
use std::time::Duration;

use tracing::trace;

use crate::error::{BrowserError, Result};
use crate::page::BrowserPage;

pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_EXPECT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitPolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }
}

/// Run `probe` until it yields a value or the policy budget is spent.
///
/// The first probe runs before any wait. Errors from `probe` abort the poll.
pub async fn poll_until<T, F, Fut>(
    page: &dyn BrowserPage,
    policy: &WaitPolicy,
    what: &str,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let mut waited = Duration::ZERO;
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if waited >= policy.timeout {
            return Err(BrowserError::timeout(what, policy.timeout));
        }
        trace!(what, waited_ms = waited.as_millis() as u64, "condition not met yet");
        page.wait_for_timeout(policy.poll_interval).await?;
        waited += policy.poll_interval;
    }
}

/// Poll a JavaScript expression until it evaluates to a truthy value.
pub async fn wait_for_function(
    page: &dyn BrowserPage,
    expression: &str,
    policy: &WaitPolicy,
) -> Result<()> {
    poll_until(page, policy, "page function to return true", move || async move {
        let value = page.evaluate(expression).await?;
        Ok(is_truthy(&value).then_some(()))
    })
    .await
}

pub(crate) fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
