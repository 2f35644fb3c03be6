use anyhow::{Context, Result, bail};
use colored::Colorize;
use snake_browser::BrowserService;
use snake_e2e::config::E2eConfig;
use snake_e2e::runner::{RunReport, ScenarioRunner};
use snake_e2e::scenarios::ScenarioId;
use std::sync::Arc;
use tracing::warn;

use crate::cli::RunArgs;
use crate::output::{OutputFormat, json::print_json, table::print_table, table::report_table};

/// Command-line flags win over the config file.
pub fn apply_overrides(config: &mut E2eConfig, args: &RunArgs) {
    if let Some(base_url) = &args.base_url {
        config.browser.base_url = base_url.clone();
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(chrome) = &args.chrome {
        config.browser.chrome_path = Some(chrome.clone());
    }
    if let Some(workers) = args.workers {
        config.run.workers = workers;
    }
    if let Some(dir) = &args.artifacts_dir {
        config.run.artifacts_dir = dir.clone();
    }
    if args.no_screenshots {
        config.run.screenshot_on_failure = false;
    }
}

/// Requested scenarios in order, duplicates dropped; all of them when none are named.
pub fn select_scenarios(requested: &[ScenarioId]) -> Vec<ScenarioId> {
    if requested.is_empty() {
        return ScenarioId::ALL.to_vec();
    }
    let mut selected = Vec::with_capacity(requested.len());
    for scenario in requested {
        if !selected.contains(scenario) {
            selected.push(*scenario);
        }
    }
    selected
}

pub async fn run(config: &E2eConfig, args: &RunArgs, format: OutputFormat) -> Result<()> {
    let options = config.runner_options()?;
    let scenarios = select_scenarios(&args.scenarios);

    let service = Arc::new(
        BrowserService::launch(config.launch_options())
            .await
            .context("Failed to launch the browser")?,
    );
    let runner = ScenarioRunner::new(service.clone(), options);
    let report = runner.run(&scenarios).await;

    if let Err(err) = service.shutdown().await {
        warn!("Failed to shut down the browser: {}", err);
    }

    if format.is_json() {
        print_json(&report)?;
    } else {
        print_table(report_table(&report))?;
        print_summary(&report);
    }

    if !report.passed() {
        bail!(
            "{} of {} scenarios failed",
            report.failed_count(),
            report.results.len()
        );
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let summary = format!(
        "{} passed, {} failed in {} ms",
        report.passed_count(),
        report.failed_count(),
        report.duration_ms
    );
    if report.passed() {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }

    for result in report.results.iter().filter(|result| !result.passed) {
        if let Some(path) = &result.screenshot {
            println!("  {} screenshot: {}", result.scenario, path.display());
        }
    }
}
