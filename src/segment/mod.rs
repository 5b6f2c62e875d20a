//! Screenshot loading and coordinate-based segmentation.
//!
//! A screenshot is cut into seven entry crops using the relative boxes from
//! [`SlotLayout`]. No content analysis happens here.

pub mod layout;
pub mod naming;

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;

use crate::error::SegmentError;

pub use layout::{PixelRect, SLOT_COUNT, SlotBox, SlotLayout};
pub use naming::{
    entry_filename, parse_entry_number, screenshot_name_for_entry, screenshot_name_from_filename,
    screenshot_name_from_path,
};

/// Minimum dimensions a screenshot needs before it is worth segmenting.
#[derive(Clone, Copy, Debug)]
pub struct MinSize {
    pub width: u32,
    pub height: u32,
}

/// A decoded screenshot and the name results are reported under.
#[derive(Debug, Clone)]
pub struct Screenshot {
    name: String,
    image: DynamicImage,
}

impl Screenshot {
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// One standings row cut out of a screenshot.
#[derive(Debug, Clone)]
pub struct EntryCrop {
    /// 1-based, top row is slot 1
    pub slot: u32,
    /// Where the crop was taken from in the source screenshot
    pub bounds: PixelRect,
    pub image: DynamicImage,
}

/// Loads a screenshot from disk, naming it after the file stem.
pub fn load_screenshot(path: &Path) -> Result<Screenshot, SegmentError> {
    let name = screenshot_name_from_path(path);
    let image = image::open(path).map_err(|source| SegmentError::ImageDecode {
        name: name.clone(),
        source,
    })?;
    Ok(Screenshot::new(name, image))
}

/// Decodes an in-memory upload. `filename` only supplies the name.
pub fn load_screenshot_from_bytes(
    filename: &str,
    bytes: &[u8],
) -> Result<Screenshot, SegmentError> {
    let name = screenshot_name_from_filename(filename);
    let image = image::load_from_memory(bytes).map_err(|source| SegmentError::ImageDecode {
        name: name.clone(),
        source,
    })?;
    Ok(Screenshot::new(name, image))
}

/// Cuts a screenshot into its seven entry crops, slot 1 first.
pub fn segment(
    screenshot: &Screenshot,
    layout: &SlotLayout,
    min_size: MinSize,
) -> Result<Vec<EntryCrop>, SegmentError> {
    let (width, height) = screenshot.dimensions();

    if width < min_size.width || height < min_size.height {
        return Err(SegmentError::Dimension {
            name: screenshot.name().to_string(),
            width,
            height,
            min_width: min_size.width,
            min_height: min_size.height,
        });
    }

    let mut crops = Vec::with_capacity(SLOT_COUNT);
    for (i, bounds) in layout.pixel_boxes(width, height).into_iter().enumerate() {
        let slot = i as u32 + 1;
        if bounds.is_empty() {
            return Err(SegmentError::EmptySlot {
                name: screenshot.name().to_string(),
                slot,
            });
        }

        debug!(
            "{}: slot {} at x={} y={} {}x{}",
            screenshot.name(),
            slot,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        );

        let image = screenshot
            .image()
            .crop_imm(bounds.x, bounds.y, bounds.width, bounds.height);
        crops.push(EntryCrop {
            slot,
            bounds,
            image,
        });
    }

    Ok(crops)
}

/// Writes each crop as `{screenshot_name}_entry_{slot}.png` into `dir`.
pub fn save_crops(
    crops: &[EntryCrop],
    screenshot_name: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>, SegmentError> {
    let mut written = Vec::with_capacity(crops.len());
    for crop in crops {
        let path = dir.join(entry_filename(screenshot_name, crop.slot));
        crop.image
            .save(&path)
            .map_err(|source| SegmentError::Io {
                path: path.clone(),
                source,
            })?;
        written.push(path);
    }
    Ok(written)
}
