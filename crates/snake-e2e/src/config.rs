//! Suite configuration file support
//!
//! Loads configuration from ~/.config/snake-e2e/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use snake_browser::{LaunchOptions, WaitPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::runner::{DEFAULT_ARTIFACTS_DIR, RunnerOptions};
use crate::steer::{MAX_STEER_ATTEMPTS, SteerPolicy, TICK_INTERVAL};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct E2eConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub steer: SteerConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Where the game is served
    pub base_url: String,
    pub headless: bool,
    /// Chrome executable; detected when unset
    pub chrome_path: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub launch_timeout_ms: u64,
    pub command_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let launch = LaunchOptions::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            chrome_path: None,
            extra_args: Vec::new(),
            launch_timeout_ms: launch.launch_timeout.as_millis() as u64,
            command_timeout_ms: launch.command_timeout.as_millis() as u64,
        }
    }
}

/// Expectation and polling budgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub expect_ms: u64,
    pub poll_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        let policy = WaitPolicy::default();
        Self {
            expect_ms: policy.timeout.as_millis() as u64,
            poll_ms: policy.poll_interval.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteerConfig {
    pub tick_ms: u64,
    pub max_attempts: u32,
}

impl Default for SteerConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_INTERVAL.as_millis() as u64,
            max_attempts: MAX_STEER_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub workers: usize,
    pub artifacts_dir: PathBuf,
    pub screenshot_on_failure: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            screenshot_on_failure: true,
        }
    }
}

impl E2eConfig {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => match Self::default_path() {
                Some(path) => Self::load_from_path(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("snake-e2e").join("config.toml"))
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.browser.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.browser.base_url))
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_millis(self.timeouts.expect_ms),
            Duration::from_millis(self.timeouts.poll_ms),
        )
    }

    pub fn steer_policy(&self) -> SteerPolicy {
        SteerPolicy {
            tick: Duration::from_millis(self.steer.tick_ms),
            max_attempts: self.steer.max_attempts,
        }
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            chrome_path: self.browser.chrome_path.clone(),
            headless: self.browser.headless,
            extra_args: self.browser.extra_args.clone(),
            launch_timeout: Duration::from_millis(self.browser.launch_timeout_ms),
            command_timeout: Duration::from_millis(self.browser.command_timeout_ms),
        }
    }

    pub fn runner_options(&self) -> Result<RunnerOptions> {
        Ok(RunnerOptions {
            base_url: self.base_url()?,
            wait: self.wait_policy(),
            steer: self.steer_policy(),
            workers: self.run.workers.max(1),
            artifacts_dir: self.run.artifacts_dir.clone(),
            screenshot_on_failure: self.run.screenshot_on_failure,
        })
    }
}
