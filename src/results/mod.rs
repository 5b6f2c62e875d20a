//! Aggregated results and their text/JSON output.

pub mod aggregate;
pub mod entry;
pub mod export;
pub mod report;

pub use aggregate::{RaceResult, aggregate};
pub use entry::{PositionSource, RaceEntry, UNKNOWN_POSITION};
pub use export::{export_to_json, result_to_json};
pub use report::{Report, SkippedScreenshot, format_report, write_report};
