//! JSON export of results.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::aggregate::RaceResult;
use super::report::{Report, SkippedScreenshot};

#[derive(Serialize)]
struct ReportExport<'a> {
    generated_at: &'a DateTime<Local>,
    total_entries: usize,
    results: &'a [RaceResult],
    skipped: &'a [SkippedScreenshot],
}

/// Structured response for a single screenshot, pretty-printed.
pub fn result_to_json(result: &RaceResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize race result to JSON")
}

/// Export a whole report to a JSON file.
///
/// The output is pretty-printed for human readability.
pub fn export_to_json(report: &Report, output_path: &Path) -> Result<()> {
    let export = ReportExport {
        generated_at: report.generated_at(),
        total_entries: report.total_entries(),
        results: report.results(),
        skipped: report.skipped(),
    };
    let json =
        serde_json::to_string_pretty(&export).context("Failed to serialize report to JSON")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create JSON file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}
