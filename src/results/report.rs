//! Text report over all processed screenshots.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::aggregate::RaceResult;

pub const REPORT_TITLE: &str = "UmaTurniej Race Results - OCR Extraction";
const HEADER_RULE_WIDTH: usize = 50;
const SCREENSHOT_RULE_WIDTH: usize = 40;

/// A screenshot that could not be processed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedScreenshot {
    pub name: String,
    pub reason: String,
}

/// Results of one batch, in the order the screenshots were submitted.
#[derive(Clone, Debug)]
pub struct Report {
    generated_at: DateTime<Local>,
    results: Vec<RaceResult>,
    skipped: Vec<SkippedScreenshot>,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    pub fn new() -> Self {
        Self {
            generated_at: Local::now(),
            results: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn push(&mut self, result: RaceResult) {
        self.results.push(result);
    }

    pub fn push_skipped(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedScreenshot {
            name: name.into(),
            reason: reason.into(),
        });
    }

    pub fn generated_at(&self) -> &DateTime<Local> {
        &self.generated_at
    }

    pub fn results(&self) -> &[RaceResult] {
        &self.results
    }

    pub fn skipped(&self) -> &[SkippedScreenshot] {
        &self.skipped
    }

    /// Entries with a recognized name, summed over all results.
    pub fn total_entries(&self) -> usize {
        self.results.iter().map(RaceResult::recognized_count).sum()
    }
}

/// Renders the report text. Lines are joined with `\n`, without a trailing
/// newline.
pub fn format_report(report: &Report) -> String {
    let mut lines: Vec<String> = vec![
        REPORT_TITLE.to_string(),
        "=".repeat(HEADER_RULE_WIDTH),
        String::new(),
    ];

    for (i, result) in report.results().iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("Screenshot: {}", result.screenshot));
        lines.push("-".repeat(SCREENSHOT_RULE_WIDTH));
        for entry in &result.entries {
            lines.push(format!(
                "  {}: {} - {}",
                entry.position_label(),
                entry.character_name,
                entry.player_name
            ));
        }
    }

    lines.push(String::new());
    lines.push("=".repeat(HEADER_RULE_WIDTH));
    lines.push(format!("Total entries processed: {}", report.total_entries()));

    lines.join("\n")
}

/// Writes the formatted report to `output_path`, replacing any old file.
pub fn write_report(report: &Report, output_path: &Path) -> Result<()> {
    let mut file = File::create(output_path)
        .context(format!("Failed to create report file: {}", output_path.display()))?;

    file.write_all(format_report(report).as_bytes())
        .context("Failed to write report")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{PositionSource, RaceEntry, aggregate};
    use tempfile::tempdir;

    fn entry(slot: u32, character: &str, player: &str) -> RaceEntry {
        RaceEntry {
            slot,
            position: Some(slot),
            position_source: PositionSource::Ocr,
            character_name: character.to_string(),
            player_name: player.to_string(),
        }
    }

    #[test]
    fn test_format_empty_report() {
        let output = format_report(&Report::new());
        assert_eq!(
            output,
            "UmaTurniej Race Results - OCR Extraction\n\
             ==================================================\n\
             \n\
             \n\
             ==================================================\n\
             Total entries processed: 0"
        );
    }

    #[test]
    fn test_format_single_screenshot_exact() {
        let mut report = Report::new();
        report.push(aggregate("race1", vec![entry(1, "Maruzensky", "Kysix")]));

        let expected = [
            "UmaTurniej Race Results - OCR Extraction",
            "==================================================",
            "",
            "Screenshot: race1",
            "----------------------------------------",
            "  1st: Maruzensky - Kysix",
            "  2nd:  - ",
            "  3rd:  - ",
            "  4th:  - ",
            "  5th:  - ",
            "  6th:  - ",
            "  7th:  - ",
            "",
            "==================================================",
            "Total entries processed: 1",
        ]
        .join("\n");

        assert_eq!(format_report(&report), expected);
    }

    #[test]
    fn test_format_multiple_screenshots_separated_by_blank_line() {
        let mut report = Report::new();
        report.push(aggregate("race1", vec![entry(1, "Special Week", "Player1")]));
        report.push(aggregate("race2", vec![entry(1, "Tokai Teio", "Player2")]));

        let output = format_report(&report);
        let lines: Vec<&str> = output.lines().collect();

        assert!(output.find("race1").unwrap() < output.find("race2").unwrap());
        let second = lines.iter().position(|l| *l == "Screenshot: race2").unwrap();
        assert_eq!(lines[second - 1], "");
        assert_eq!(lines[second - 2], "  7th:  - ");
        assert!(output.ends_with("Total entries processed: 2"));
    }

    #[test]
    fn test_format_unknown_position() {
        let mut unknown = entry(1, "", "SomePlayer");
        unknown.position = None;
        unknown.position_source = PositionSource::Unknown;

        let mut report = Report::new();
        report.push(aggregate("shot", vec![unknown]));

        let output = format_report(&report);
        assert!(output.contains("  [Unknown Position]:  - SomePlayer"));
    }

    #[test]
    fn test_format_is_idempotent() {
        let mut report = Report::new();
        report.push(aggregate("race1", vec![entry(1, "Vodka", "A"), entry(2, "Gold Ship", "B")]));

        assert_eq!(format_report(&report), format_report(&report));
    }

    #[test]
    fn test_skipped_screenshots_not_rendered() {
        let mut report = Report::new();
        report.push_skipped("broken", "could not decode");

        let output = format_report(&report);
        assert!(!output.contains("broken"));
        assert_eq!(report.skipped().len(), 1);
    }

    #[test]
    fn test_write_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("race_results.txt");

        let mut report = Report::new();
        report.push(aggregate("race1", vec![entry(1, "Oguri Cap", "Tama")]));
        write_report(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format_report(&report));
    }
}
