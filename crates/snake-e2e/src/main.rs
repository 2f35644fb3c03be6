mod cli;
mod commands;
mod completions;
mod error;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use snake_e2e::config::E2eConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error::handle_error(err);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Completions { shell } => {
            completions::generate_completions(*shell);
            Ok(())
        }
        Commands::List => commands::list::run(cli.format),
        Commands::Probe { chrome } => {
            let config = E2eConfig::load(cli.config.as_deref())?;
            let _guard = logging::init(None, cli.verbose)?;
            let chrome = chrome.clone().or(config.browser.chrome_path);
            commands::probe::run(chrome.as_deref(), cli.format).await
        }
        Commands::Run(args) => {
            let mut config = E2eConfig::load(cli.config.as_deref())?;
            commands::run::apply_overrides(&mut config, args);

            let log_dir = config.run.artifacts_dir.join("logs");
            let _guard = logging::init(Some(&log_dir), cli.verbose)?;
            tracing::info!(base_url = %config.browser.base_url, "Loaded configuration");

            commands::run::run(&config, args, cli.format).await
        }
    }
}
