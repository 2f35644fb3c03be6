use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use snake_e2e::scenarios::ScenarioId;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "snake-e2e")]
#[command(version, about = "Snake E2E - browser scenarios for the Snake game")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.config/snake-e2e/config.toml)
    #[arg(long, global = true, env = "SNAKE_E2E_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run scenarios against the game in a fresh browser
    Run(RunArgs),

    /// List available scenarios
    List,

    /// Check that a usable Chrome/Chromium is installed
    Probe {
        /// Chrome executable to check instead of auto-detection
        #[arg(long, env = "SNAKE_E2E_CHROME")]
        chrome: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Scenario to run (repeatable; all scenarios when omitted)
    #[arg(short, long = "scenario", value_enum)]
    pub scenarios: Vec<ScenarioId>,

    /// Where the game is served
    #[arg(long, env = "SNAKE_E2E_BASE_URL")]
    pub base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Scenarios to run in parallel, one tab each
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Chrome executable (auto-detected when omitted)
    #[arg(long, env = "SNAKE_E2E_CHROME")]
    pub chrome: Option<PathBuf>,

    /// Directory for logs and failure screenshots
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Skip screenshots of failed scenarios
    #[arg(long)]
    pub no_screenshots: bool,
}
