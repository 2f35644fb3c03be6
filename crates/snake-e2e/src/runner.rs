//! Scenario execution and the run report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use snake_browser::{BrowserPage, PageFactory, WaitPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::page::SnakeGamePage;
use crate::scenarios::ScenarioId;
use crate::steer::SteerPolicy;

pub const DEFAULT_ARTIFACTS_DIR: &str = "test-results";

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub base_url: Url,
    pub wait: WaitPolicy,
    pub steer: SteerPolicy,
    /// Scenarios in flight at once; each gets its own page.
    pub workers: usize,
    pub artifacts_dir: PathBuf,
    pub screenshot_on_failure: bool,
}

impl RunnerOptions {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            wait: WaitPolicy::default(),
            steer: SteerPolicy::default(),
            workers: 1,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            screenshot_on_failure: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: ScenarioId,
    pub description: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|result| result.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|result| result.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }
}

pub struct ScenarioRunner {
    factory: Arc<dyn PageFactory>,
    options: RunnerOptions,
}

impl ScenarioRunner {
    pub fn new(factory: Arc<dyn PageFactory>, options: RunnerOptions) -> Self {
        Self { factory, options }
    }

    pub async fn run_all(&self) -> RunReport {
        self.run(&ScenarioId::ALL).await
    }

    /// Run the given scenarios; results come back in the requested order.
    pub async fn run(&self, scenarios: &[ScenarioId]) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();
        let workers = self.options.workers.max(1);

        info!(%run_id, scenarios = scenarios.len(), workers, "Starting run");

        let results: Vec<ScenarioResult> = stream::iter(scenarios.iter().copied())
            .map(|scenario| self.run_one(run_id, scenario))
            .buffered(workers)
            .collect()
            .await;

        let report = RunReport {
            run_id,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            results,
        };
        info!(
            %run_id,
            passed = report.passed_count(),
            failed = report.failed_count(),
            duration_ms = report.duration_ms,
            "Run finished"
        );
        report
    }

    async fn run_one(&self, run_id: Uuid, scenario: ScenarioId) -> ScenarioResult {
        info!(%scenario, "Scenario started");
        let started = Instant::now();

        let page = match self.factory.new_page().await {
            Ok(page) => page,
            Err(err) => {
                let err = anyhow::Error::from(err).context("Failed to open a page");
                return finish(scenario, started, Err(err), None);
            }
        };

        let game = SnakeGamePage::with_policies(
            page.clone(),
            self.options.base_url.clone(),
            self.options.wait,
            self.options.steer,
        );
        let outcome: Result<()> = async {
            game.navigate().await?;
            game.wait_until_ready().await?;
            scenario.run(&game).await
        }
        .await;

        let screenshot = if outcome.is_err() && self.options.screenshot_on_failure {
            self.capture(page.as_ref(), run_id, scenario).await
        } else {
            None
        };

        if let Err(err) = page.close().await {
            warn!(%scenario, "Failed to close page: {}", err);
        }

        finish(scenario, started, outcome, screenshot)
    }

    async fn capture(
        &self,
        page: &dyn BrowserPage,
        run_id: Uuid,
        scenario: ScenarioId,
    ) -> Option<PathBuf> {
        let dir = self.options.artifacts_dir.join(run_id.to_string());
        let path = dir.join(format!("{}.png", scenario.name()));

        let saved: Result<()> = async {
            let bytes = page.screenshot().await?;
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            tokio::fs::write(&path, bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(())
        }
        .await;

        match saved {
            Ok(()) => Some(path),
            Err(err) => {
                warn!(%scenario, "Failed to capture screenshot: {:#}", err);
                None
            }
        }
    }
}

fn finish(
    scenario: ScenarioId,
    started: Instant,
    outcome: Result<()>,
    screenshot: Option<PathBuf>,
) -> ScenarioResult {
    let duration_ms = started.elapsed().as_millis() as u64;
    let error = outcome.err().map(|err| format!("{:#}", err));
    match &error {
        None => info!(%scenario, duration_ms, "Scenario passed"),
        Some(message) => info!(%scenario, duration_ms, error = %message, "Scenario failed"),
    }

    ScenarioResult {
        scenario,
        description: scenario.description().to_string(),
        passed: error.is_none(),
        duration_ms,
        error,
        screenshot,
    }
}
