//! Per-crop text extraction.
//!
//! An entry crop is split into bands (position on the left, names on the
//! right) and each band is sent to the OCR engine. Nothing here judges
//! whether the recognized names are plausible; that is the parser's job.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{OcrEngine, OcrLine, PageSegMode};
use super::preprocess::{NamePreprocess, RelativeRect, Variant, apply_variant, crop_region};
use crate::error::OcrError;
use crate::parse::find_position;
use crate::segment::EntryCrop;

/// Raw, trimmed OCR text for the three fields of one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTextRegions {
    pub position_text: String,
    pub character_text: String,
    pub player_text: String,
}

impl RawTextRegions {
    pub fn new(
        position_text: impl Into<String>,
        character_text: impl Into<String>,
        player_text: impl Into<String>,
    ) -> Self {
        Self {
            position_text: position_text.into().trim().to_string(),
            character_text: character_text.into().trim().to_string(),
            player_text: player_text.into().trim().to_string(),
        }
    }
}

/// How the name area of a crop is read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Character and player names are read from separate bands
    #[default]
    Banded,
    /// The whole name area is read at once and split by the parser
    Whole,
}

/// Band rectangles relative to an entry crop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandLayout {
    pub position: RelativeRect,
    pub character: RelativeRect,
    pub player: RelativeRect,
    /// Used instead of `character` and `player` in [`ExtractMode::Whole`]
    pub names: RelativeRect,
}

impl Default for BandLayout {
    fn default() -> Self {
        Self {
            position: RelativeRect { x: 0.0, y: 0.0, width: 0.15, height: 1.0 },
            character: RelativeRect { x: 0.2, y: 0.0, width: 0.8, height: 0.5 },
            player: RelativeRect { x: 0.2, y: 0.5, width: 0.8, height: 0.5 },
            names: RelativeRect { x: 0.2, y: 0.0, width: 0.8, height: 1.0 },
        }
    }
}

/// Settings for a [`TextExtractor`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractOptions {
    pub bands: BandLayout,
    pub mode: ExtractMode,
    /// Page segmentation modes tried, in order, on the position band
    pub position_modes: Vec<PageSegMode>,
    pub name_mode: PageSegMode,
    pub contrast_factor: f32,
    /// Name words at or below this confidence are dropped
    pub min_confidence: f32,
    pub name_preprocess: NamePreprocess,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            bands: BandLayout::default(),
            mode: ExtractMode::default(),
            position_modes: vec![
                PageSegMode::SINGLE_LINE,
                PageSegMode::SINGLE_WORD,
                PageSegMode::BLOCK,
                PageSegMode::SPARSE,
            ],
            name_mode: PageSegMode::BLOCK,
            contrast_factor: 2.0,
            min_confidence: 40.0,
            name_preprocess: NamePreprocess::default(),
        }
    }
}

/// Reads the raw text of entry crops through an [`OcrEngine`].
pub struct TextExtractor<'a> {
    engine: &'a dyn OcrEngine,
    options: ExtractOptions,
}

impl<'a> TextExtractor<'a> {
    pub fn new(engine: &'a dyn OcrEngine, options: ExtractOptions) -> Self {
        Self { engine, options }
    }

    /// Runs OCR over the bands of one crop.
    ///
    /// Fails only when the engine itself fails.
    pub fn extract(&self, crop: &EntryCrop) -> Result<RawTextRegions, OcrError> {
        let bands = &self.options.bands;

        let position_region = crop_region(&crop.image, &bands.position);
        let position_text = self.read_position(&position_region)?;

        let (character_text, player_text) = match self.options.mode {
            ExtractMode::Banded => {
                let character = self.read_names(&crop_region(&crop.image, &bands.character))?;
                let player = self.read_names(&crop_region(&crop.image, &bands.player))?;
                (character, player)
            }
            ExtractMode::Whole => {
                let names = self.read_names(&crop_region(&crop.image, &bands.names))?;
                (names, String::new())
            }
        };

        let regions = RawTextRegions::new(position_text, character_text, player_text);
        debug!(
            "slot {}: position={:?} character={:?} player={:?}",
            crop.slot, regions.position_text, regions.character_text, regions.player_text
        );
        Ok(regions)
    }

    /// Tries every preprocessing variant with every page segmentation mode
    /// until one yields an ordinal. Falls back to the first non-empty text.
    fn read_position(&self, region: &GrayImage) -> Result<String, OcrError> {
        if region.width() == 0 || region.height() == 0 {
            return Ok(String::new());
        }

        let variants = [
            Variant::Gray,
            Variant::Inverted,
            Variant::Contrast(self.options.contrast_factor),
        ];

        let mut first_text: Option<String> = None;
        for variant in variants {
            let prepared = apply_variant(region, variant);
            for &mode in &self.options.position_modes {
                let text = self.engine.recognize(&prepared, mode)?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if find_position(text).is_some() {
                    return Ok(text.to_string());
                }
                first_text.get_or_insert_with(|| text.to_string());
            }
        }

        Ok(first_text.unwrap_or_default())
    }

    /// Reads a name band, keeping only confident words. Lines are joined
    /// with `\n` so the parser can still tell them apart.
    fn read_names(&self, region: &GrayImage) -> Result<String, OcrError> {
        if region.width() == 0 || region.height() == 0 {
            return Ok(String::new());
        }
        let prepared = self.options.name_preprocess.apply(region);
        let lines = self.engine.recognize_words(&prepared, self.options.name_mode)?;
        Ok(confident_text(&lines, self.options.min_confidence))
    }
}

fn confident_text(lines: &[OcrLine], min_confidence: f32) -> String {
    lines
        .iter()
        .map(|line| {
            line.words
                .iter()
                .filter(|word| word.confidence > min_confidence)
                .map(|word| word.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
