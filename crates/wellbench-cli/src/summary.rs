//! Terminal summary of a finished sweep

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use wellbench_core::{MetricMean, SweepOutcome};

/// One row per aggregation key, one column per exported metric
pub fn table(outcome: &SweepOutcome) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut headers: Vec<String> = vec!["executable".to_string()];
    headers.extend(outcome.labels.iter().cloned());
    headers.extend(["variant", "trials", "timeouts"].map(String::from));
    headers.extend(outcome.metrics.iter().map(|m| m.label().to_string()));
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );

    for result in &outcome.results {
        for entry in result.series.entries() {
            let mut row = vec![Cell::new(&result.name)];
            row.extend(entry.key.coordinate.iter().map(Cell::new));
            row.push(Cell::new(&entry.key.variant));
            row.push(Cell::new(entry.trials));
            row.push(if entry.timeouts > 0 {
                Cell::new(entry.timeouts).fg(Color::Yellow)
            } else {
                Cell::new(entry.timeouts)
            });
            for metric in &outcome.metrics {
                row.push(match entry.mean(*metric) {
                    MetricMean::Mean { value, .. } => Cell::new(format!("{:.3}", value)),
                    MetricMean::NoData => Cell::new("-").fg(Color::Yellow),
                });
            }
            table.add_row(row);
        }
    }

    table
}

/// Heading plus table
pub fn render(outcome: &SweepOutcome) -> String {
    let insufficient: usize = outcome
        .results
        .iter()
        .map(|r| r.series.insufficient().count())
        .sum();

    let mut out = format!("\n{} {}\n{}\n", "▶".cyan(), outcome.title.bold(), table(outcome));
    if insufficient > 0 {
        out.push_str(&format!(
            "{} {} key(s) without valid samples\n",
            "⚠".yellow(),
            insufficient
        ));
    }
    out
}
