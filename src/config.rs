//! Pipeline configuration.
//!
//! Loads settings from config.json. Every field has a default, so a partial
//! file only overrides what it names and a missing or broken file falls back
//! to the built-in layout.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::ocr::{BandLayout, ExtractMode, ExtractOptions, NamePreprocess, PageSegMode};
use crate::segment::{MinSize, SlotLayout};

/// Complete pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Relative boxes of the seven standings rows
    pub layout: SlotLayout,
    /// Bands inside each entry crop
    pub bands: BandLayout,
    pub extract_mode: ExtractMode,
    /// Screenshots narrower than this are rejected
    pub min_width: u32,
    /// Screenshots shorter than this are rejected (7 rows need some pixels)
    pub min_height: u32,
    /// Tesseract language code
    pub language: String,
    /// Page segmentation modes tried on the position band, in order
    pub position_psm_modes: Vec<PageSegMode>,
    /// Page segmentation mode for the name bands
    pub name_psm: PageSegMode,
    /// Contrast factor for the third position-band attempt
    pub contrast_factor: f32,
    /// Name words at or below this Tesseract confidence are dropped
    pub min_confidence: f32,
    /// Upscale factor for name bands before OCR
    pub name_scale: u32,
    /// Otsu-binarize name bands before OCR
    pub name_binarize: bool,
    /// Write `{name}_entry_{slot}.png` for every crop
    pub save_crops: bool,
    /// OCR the seven slots of a screenshot concurrently
    pub parallel_slots: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let extract = ExtractOptions::default();
        Self {
            layout: SlotLayout::default(),
            bands: extract.bands,
            extract_mode: extract.mode,
            min_width: 70,
            min_height: 70,
            language: "eng".to_string(),
            position_psm_modes: extract.position_modes,
            name_psm: extract.name_mode,
            contrast_factor: extract.contrast_factor,
            min_confidence: extract.min_confidence,
            name_scale: extract.name_preprocess.scale,
            name_binarize: extract.name_preprocess.binarize,
            save_crops: true,
            parallel_slots: true,
        }
    }
}

impl AppConfig {
    pub fn min_size(&self) -> MinSize {
        MinSize {
            width: self.min_width,
            height: self.min_height,
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            bands: self.bands,
            mode: self.extract_mode,
            position_modes: self.position_psm_modes.clone(),
            name_mode: self.name_psm,
            contrast_factor: self.contrast_factor,
            min_confidence: self.min_confidence,
            name_preprocess: NamePreprocess {
                scale: self.name_scale.max(1),
                binarize: self.name_binarize,
            },
        }
    }
}

/// Loads configuration from `config_path` or returns defaults.
pub fn load_config(config_path: &Path) -> AppConfig {
    info!("Looking for config at: {}", config_path.display());

    if !config_path.exists() {
        info!("{} not found. Using default config.", config_path.display());
        return AppConfig::default();
    }

    match fs::read_to_string(config_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                info!("Config loaded from {}", config_path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Failed to parse {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                AppConfig::default()
            }
        },
        Err(e) => {
            warn!(
                "Failed to read {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            AppConfig::default()
        }
    }
}
