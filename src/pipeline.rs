//! End-to-end processing of screenshots.
//!
//! Each screenshot runs through segment → extract → parse → aggregate on its
//! own. A batch keeps going when one screenshot cannot be decoded or is too
//! small, but stops at the first OCR engine failure.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{OcrError, PipelineError};
use crate::ocr::{OcrEngine, TextExtractor};
use crate::parse::parse_entry;
use crate::results::{RaceEntry, RaceResult, Report, aggregate};
use crate::segment::{
    self, EntryCrop, Screenshot, load_screenshot, load_screenshot_from_bytes, parse_entry_number,
    save_crops, screenshot_name_for_entry,
};

const SCREENSHOT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub struct Pipeline<'a> {
    config: AppConfig,
    extractor: TextExtractor<'a>,
    /// Where crops are persisted when `save_crops` is on
    crop_dir: Option<PathBuf>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: AppConfig, engine: &'a dyn OcrEngine) -> Self {
        let extractor = TextExtractor::new(engine, config.extract_options());
        Self {
            config,
            extractor,
            crop_dir: None,
        }
    }

    /// Persist entry crops into `dir` (only if `save_crops` is enabled).
    pub fn with_crop_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.crop_dir = Some(dir.into());
        self
    }

    /// Runs the full pipeline on one decoded screenshot.
    pub fn process_screenshot(&self, screenshot: &Screenshot) -> Result<RaceResult, PipelineError> {
        let crops = segment::segment(screenshot, &self.config.layout, self.config.min_size())?;

        if self.config.save_crops {
            if let Some(dir) = &self.crop_dir {
                let written = save_crops(&crops, screenshot.name(), dir)?;
                debug!("{}: saved {} crops to {}", screenshot.name(), written.len(), dir.display());
            }
        }

        let entries = self.read_crops(&crops)?;
        let result = aggregate(screenshot.name(), entries);

        info!(
            "{}: {} of {} entries recognized",
            screenshot.name(),
            result.recognized_count(),
            result.entries.len()
        );
        Ok(result)
    }

    /// Loads a screenshot from disk and processes it.
    pub fn process_path(&self, path: &Path) -> Result<RaceResult, PipelineError> {
        let screenshot = load_screenshot(path)?;
        self.process_screenshot(&screenshot)
    }

    /// Processes an uploaded image buffer; `filename` names the result.
    pub fn process_upload(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<RaceResult, PipelineError> {
        let screenshot = load_screenshot_from_bytes(filename, bytes)?;
        self.process_screenshot(&screenshot)
    }

    /// Processes screenshots in the given order.
    ///
    /// Per-screenshot failures are logged and recorded as skipped; an OCR
    /// engine failure aborts the batch.
    pub fn run_batch<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Report, PipelineError> {
        let mut report = Report::new();

        for path in paths {
            let path = path.as_ref();
            info!("Processing: {}", path.display());

            match self.process_path(path) {
                Ok(result) => report.push(result),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.push_skipped(segment::screenshot_name_from_path(path), e.to_string());
                }
            }
        }

        info!(
            "Batch complete: {} processed, {} skipped, {} entries",
            report.results().len(),
            report.skipped().len(),
            report.total_entries()
        );
        Ok(report)
    }

    /// Re-runs OCR over persisted `{name}_entry_{slot}.png` crops.
    ///
    /// Crops are grouped by screenshot name (sorted); files whose name does
    /// not follow the crop pattern are skipped.
    pub fn run_cropped_dir(&self, dir: &Path) -> Result<Report, PipelineError> {
        let mut groups: BTreeMap<String, Vec<(u32, PathBuf)>> = BTreeMap::new();

        for path in list_files(dir, &["png"])? {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match (parse_entry_number(&filename), screenshot_name_for_entry(&filename)) {
                (Ok(slot), Ok(name)) => groups.entry(name).or_default().push((slot, path)),
                (Err(e), _) | (_, Err(e)) => warn!("Could not parse entry number: {}", e),
            }
        }

        let mut report = Report::new();
        for (name, mut files) in groups {
            files.sort_by_key(|(slot, _)| *slot);
            let mut entries = Vec::with_capacity(files.len());
            let mut failed = None;

            for (slot, path) in files {
                let crop = match load_screenshot(&path) {
                    Ok(image) => EntryCrop {
                        slot,
                        bounds: segment::PixelRect {
                            x: 0,
                            y: 0,
                            width: image.image().width(),
                            height: image.image().height(),
                        },
                        image: image.image().clone(),
                    },
                    Err(e) => {
                        failed = Some(e.to_string());
                        break;
                    }
                };
                entries.push(self.read_crop(&crop)?);
            }

            match failed {
                Some(reason) => {
                    warn!("Skipping {}: {}", name, reason);
                    report.push_skipped(name, reason);
                }
                None => report.push(aggregate(&name, entries)),
            }
        }

        Ok(report)
    }

    fn read_crop(&self, crop: &EntryCrop) -> Result<RaceEntry, OcrError> {
        let regions = self.extractor.extract(crop)?;
        Ok(parse_entry(crop.slot, &regions, self.config.extract_mode))
    }

    fn read_crops(&self, crops: &[EntryCrop]) -> Result<Vec<RaceEntry>, OcrError> {
        if self.config.parallel_slots {
            // Order is restored by slot in `aggregate`
            crops.par_iter().map(|crop| self.read_crop(crop)).collect()
        } else {
            crops.iter().map(|crop| self.read_crop(crop)).collect()
        }
    }
}

/// Lists screenshots (png/jpg/jpeg) in `dir`, sorted by name, skipping
/// hidden files.
pub fn list_screenshots(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    list_files(dir, SCREENSHOT_EXTENSIONS)
}

fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, PipelineError> {
    let read_dir = fs::read_dir(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = read_dir
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let hidden = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true);
            let matches_ext = path
                .extension()
                .map(|ext| extensions.contains(&ext.to_string_lossy().to_lowercase().as_str()))
                .unwrap_or(false);
            !hidden && matches_ext
        })
        .collect();

    files.sort();
    Ok(files)
}
