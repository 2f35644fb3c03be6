//! Browser runtime for end-to-end game checks.
//!
//! This crate drives Chrome through `chromiumoxide` and exposes a small,
//! testable surface:
//! - [`BrowserPage`] and [`PageFactory`], the seam scenario code talks to
//! - [`BrowserService`], which launches Chrome and hands out isolated tabs
//! - [`Locator`], selector-bound handles with actionability waits
//! - bounded polling ([`poll_until`], [`wait_for_function`]) and retrying
//!   expectations ([`Locator::expect`], [`expect_title`])

pub mod cdp;
pub mod error;
pub mod locator;
pub mod page;
pub mod service;
pub mod wait;

pub use cdp::{CdpPage, SUPPORTED_KEYS};
pub use error::{BrowserError, Result};
pub use locator::{Condition, ElementState, Locator, expect_title};
pub use page::{BrowserPage, ElementInfo, PageFactory};
pub use service::{
    BrowserService, LaunchOptions, RuntimeProbe, detect_chrome_executable, probe_runtime,
};
pub use wait::{DEFAULT_EXPECT_TIMEOUT, DEFAULT_POLL_INTERVAL, WaitPolicy, poll_until, wait_for_function};
