//! Two-column table rendering for prediction lists.

use studio_core::PredictionList;

const MAX_ROWS: usize = 10;

/// Render the top rows as a `Label | Score` table, scores to 2 decimals.
pub fn format_table(predictions: &PredictionList) -> String {
    let shown = || predictions.iter().take(MAX_ROWS);
    let width = shown()
        .map(|p| p.label().chars().count())
        .max()
        .unwrap_or(0)
        .max("Label".len());

    let mut out = format!("{:<width$}  {:>5}\n", "Label", "Score");
    out.push_str(&format!("{}  {}\n", "-".repeat(width), "-".repeat(5)));
    for p in shown() {
        out.push_str(&format!("{:<width$}  {:>5.2}\n", p.label(), p.score()));
    }
    if predictions.len() > MAX_ROWS {
        out.push_str(&format!("... and {} more\n", predictions.len() - MAX_ROWS));
    }
    out
}

/// Print the table and, with `raw`, the JSON view below it.
pub fn print_predictions(predictions: &PredictionList, raw: bool) -> anyhow::Result<()> {
    print!("{}", format_table(predictions));
    if raw {
        println!();
        println!("{}", predictions.to_json_pretty()?);
    }
    Ok(())
}
