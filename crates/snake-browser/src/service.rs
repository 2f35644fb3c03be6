//! Chrome lifecycle and runtime probing.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cdp::CdpPage;
use crate::error::{BrowserError, Result};
use crate::page::{BrowserPage, PageFactory};

const CHROME_ENV: &str = "SNAKE_E2E_CHROME";
const DEFAULT_LAUNCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;
const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

const CHROME_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeProbe {
    pub chrome_path: Option<String>,
    pub chrome_version: Option<String>,
    pub ready: bool,
    pub notes: Vec<String>,
}

impl RuntimeProbe {
    fn empty() -> Self {
        Self {
            chrome_path: None,
            chrome_version: None,
            ready: false,
            notes: Vec::new(),
        }
    }
}

/// Locate a Chrome executable and check that it runs.
pub async fn probe_runtime(chrome_path: Option<&Path>) -> RuntimeProbe {
    let mut probe = RuntimeProbe::empty();

    let Some(path) = chrome_path
        .map(Path::to_path_buf)
        .or_else(detect_chrome_executable)
    else {
        probe.notes.push(format!(
            "Chrome/Chromium not found. Install it or point {} at the executable.",
            CHROME_ENV
        ));
        return probe;
    };
    probe.chrome_path = Some(path.display().to_string());

    match run_command_capture(&path, &["--version".to_string()], 10).await {
        Ok(output) if output.exit_code == 0 => {
            probe.chrome_version = Some(output.stdout.trim().to_string());
            probe.ready = true;
        }
        Ok(output) => probe.notes.push(format!(
            "{} --version exited with code {}: {}",
            path.display(),
            output.exit_code,
            output.stderr.trim()
        )),
        Err(err) => probe
            .notes
            .push(format!("Failed to run {}: {}", path.display(), err)),
    }

    probe
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub extra_args: Vec<String>,
    pub launch_timeout: Duration,
    /// Upper bound for a single DevTools command, navigation included.
    pub command_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            extra_args: Vec::new(),
            launch_timeout: Duration::from_secs(DEFAULT_LAUNCH_TIMEOUT_SECS),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }
}

/// A running Chrome with a throwaway profile.
pub struct BrowserService {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    options: LaunchOptions,
    _profile: TempDir,
}

impl BrowserService {
    pub async fn launch(options: LaunchOptions) -> Result<Self> {
        let chrome = options
            .chrome_path
            .clone()
            .or_else(detect_chrome_executable)
            .ok_or_else(|| {
                BrowserError::Launch(format!(
                    "Chrome/Chromium not found; set {} or pass --chrome",
                    CHROME_ENV
                ))
            })?;

        let profile = tempfile::Builder::new()
            .prefix("snake-e2e-profile-")
            .tempdir()?;

        let mut builder = ChromeConfig::builder()
            .chrome_executable(&chrome)
            .user_data_dir(profile.path())
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .launch_timeout(options.launch_timeout)
            .request_timeout(options.command_timeout)
            .args(chrome_args(&options));
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        info!(chrome = %chrome.display(), headless = options.headless, "Launching browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| BrowserError::Launch(format!("{}: {}", chrome.display(), err)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!("Browser handler error: {}", err);
                }
            }
            debug!("Browser handler finished");
        });

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            options,
            _profile: profile,
        })
    }

    pub async fn open_page(&self) -> Result<CdpPage> {
        let page = self.browser.lock().await.new_page("about:blank").await?;
        debug!("Opened tab");
        Ok(CdpPage::new(page, self.options.command_timeout))
    }

    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down browser");
        let mut browser = self.browser.lock().await;
        if let Err(err) = browser.close().await {
            warn!("Failed to close browser: {}", err);
        }
        if let Err(err) = browser.wait().await {
            warn!("Failed to wait for browser exit: {}", err);
        }
        self.handler.abort();
        Ok(())
    }
}

impl Drop for BrowserService {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl PageFactory for BrowserService {
    async fn new_page(&self) -> Result<Arc<dyn BrowserPage>> {
        Ok(Arc::new(self.open_page().await?))
    }
}

/// Flags passed on top of the ones `chromiumoxide` sets itself.
fn chrome_args(options: &LaunchOptions) -> Vec<String> {
    let mut args = vec![
        "--no-default-browser-check".to_string(),
        // Game loops run on timers; background tabs must not be throttled.
        "--disable-background-timer-throttling".to_string(),
        "--disable-backgrounding-occluded-windows".to_string(),
        "--disable-renderer-backgrounding".to_string(),
    ];
    args.extend(options.extra_args.iter().cloned());
    args
}

struct CommandCapture {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

async fn run_command_capture(
    program: &Path,
    args: &[String],
    timeout_secs: u64,
) -> Result<CommandCapture> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let limit = Duration::from_secs(timeout_secs);
    let output = match timeout(limit, command.output()).await {
        Ok(result) => result?,
        Err(_) => return Err(BrowserError::timeout(program.display().to_string(), limit)),
    };

    Ok(CommandCapture {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

pub fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CHROME_ENV) {
        let parsed = PathBuf::from(path);
        if parsed.exists() {
            return Some(parsed);
        }
    }

    if let Some(path) = CHROME_NAMES.iter().find_map(|name| which::which(name).ok()) {
        return Some(path);
    }

    let mut candidates = vec![
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
        PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
    ];
    candidates.extend(playwright_chromium_candidates());

    candidates.into_iter().find(|path| path.exists())
}

/// Chromium builds downloaded by `npx playwright install chromium`.
fn playwright_chromium_candidates() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(path) = std::env::var("PLAYWRIGHT_BROWSERS_PATH") {
        roots.push(PathBuf::from(path));
    }
    if let Ok(home) = std::env::var("HOME") {
        roots.push(PathBuf::from(&home).join(".cache/ms-playwright"));
        roots.push(PathBuf::from(&home).join("Library/Caches/ms-playwright"));
    }

    let mut candidates = Vec::new();
    for root in roots {
        let Ok(entries) = std::fs::read_dir(&root) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with("chromium-") {
                continue;
            }
            candidates.push(entry.path().join("chrome-linux/chrome"));
            candidates.push(entry.path().join("chrome-linux64/chrome"));
            candidates.push(
                entry
                    .path()
                    .join("chrome-mac/Chromium.app/Contents/MacOS/Chromium"),
            );
        }
    }
    candidates
}
