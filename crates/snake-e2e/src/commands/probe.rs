use anyhow::{Result, bail};
use colored::Colorize;
use snake_browser::probe_runtime;
use std::path::Path;

use crate::output::{OutputFormat, json::print_json};

pub async fn run(chrome: Option<&Path>, format: OutputFormat) -> Result<()> {
    let probe = probe_runtime(chrome).await;

    if format.is_json() {
        print_json(&probe)?;
    } else {
        println!("Browser runtime");
        println!(
            "Chrome: {}",
            probe.chrome_path.as_deref().unwrap_or("not found")
        );
        println!(
            "Version: {}",
            probe.chrome_version.as_deref().unwrap_or("unknown")
        );
        let status = if probe.ready {
            "ready".green()
        } else {
            "not ready".red()
        };
        println!("Status: {status}");
        for note in &probe.notes {
            println!("  - {note}");
        }
    }

    if !probe.ready {
        bail!("Browser runtime is not ready");
    }
    Ok(())
}
