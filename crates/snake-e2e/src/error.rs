use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let msg = format!("{:#}", err).to_lowercase();

    if msg.contains("chrome/chromium not found") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Install Chrome or Chromium, or point the suite at it with:");
        eprintln!("  {} snake-e2e run --chrome /path/to/chrome", "$".dimmed());
        eprintln!("  {} snake-e2e probe", "$".dimmed());
    }

    if msg.contains("connection refused") || msg.contains("err_connection_refused") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Make sure the game is being served, then pass its address with:");
        eprintln!("  {} snake-e2e run --base-url http://localhost:8080", "$".dimmed());
    }

    if msg.contains("window.snakegame") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  The page loaded but does not expose window.snakeGame.");
        eprintln!("  Check that --base-url points at the Snake game.");
    }

    if msg.contains("scenarios failed") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Rerun a single scenario with verbose logs:");
        eprintln!("  {} snake-e2e run --scenario <id> --verbose", "$".dimmed());
    }

    std::process::exit(1);
}
