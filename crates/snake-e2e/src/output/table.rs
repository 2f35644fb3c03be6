use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use snake_e2e::runner::RunReport;
use snake_e2e::scenarios::ScenarioId;

const ERROR_WIDTH: usize = 80;

pub fn print_table(table: Table) -> Result<()> {
    println!("{table}");
    Ok(())
}

pub fn report_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Scenario", "Result", "Duration", "Error"]);

    for result in &report.results {
        let status = if result.passed {
            Cell::new("PASS").fg(Color::Green)
        } else {
            Cell::new("FAIL").fg(Color::Red)
        };
        let error = result
            .error
            .as_deref()
            .map(|message| truncate(first_line(message), ERROR_WIDTH))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(result.scenario.name()),
            status,
            Cell::new(format!("{} ms", result.duration_ms)),
            Cell::new(error),
        ]);
    }

    table
}

pub fn scenario_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Scenario", "Description"]);
    for scenario in ScenarioId::ALL {
        table.add_row(vec![
            Cell::new(scenario.name()),
            Cell::new(scenario.description()),
        ]);
    }
    table
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
