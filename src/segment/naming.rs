//! Filenames of persisted entry crops: `{screenshot_name}_entry_{slot}.png`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::PipelineError;

static ENTRY_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*)_entry_(\d+)\.png$").expect("entry filename pattern is valid")
});

/// Builds the crop filename for one slot.
pub fn entry_filename(screenshot_name: &str, slot: u32) -> String {
    format!("{}_entry_{}.png", screenshot_name, slot)
}

/// Recovers the slot index from a crop filename.
///
/// `"race1_entry_3.png"` yields `3`. Anything not ending in
/// `_entry_<digits>.png` is rejected.
pub fn parse_entry_number(filename: &str) -> Result<u32, PipelineError> {
    ENTRY_FILENAME
        .captures(filename)
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| PipelineError::InvalidEntryFilename(filename.to_string()))
}

/// Recovers the screenshot name from a crop filename.
pub fn screenshot_name_for_entry(filename: &str) -> Result<String, PipelineError> {
    ENTRY_FILENAME
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PipelineError::InvalidEntryFilename(filename.to_string()))
}

/// Screenshot name for a source path: the file name without its extension.
pub fn screenshot_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "screenshot".to_string())
}

/// Same as [`screenshot_name_from_path`] for an uploaded filename.
pub fn screenshot_name_from_filename(filename: &str) -> String {
    screenshot_name_from_path(Path::new(filename))
}
