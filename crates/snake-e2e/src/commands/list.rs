use anyhow::Result;
use serde_json::json;
use snake_e2e::scenarios::ScenarioId;

use crate::output::{OutputFormat, json::print_json, table::print_table, table::scenario_table};

pub fn run(format: OutputFormat) -> Result<()> {
    if format.is_json() {
        let scenarios: Vec<_> = ScenarioId::ALL
            .iter()
            .map(|scenario| {
                json!({
                    "id": scenario.name(),
                    "description": scenario.description(),
                })
            })
            .collect();
        return print_json(&scenarios);
    }

    print_table(scenario_table())
}
