//! Error types shared by the pipeline stages.
//!
//! Segmentation failures are scoped to a single screenshot; OCR engine
//! failures invalidate the whole run.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or cutting up a screenshot.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("could not decode image {name}: {source}")]
    ImageDecode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("image {name} is {width}x{height}, minimum is {min_width}x{min_height}")]
    Dimension {
        name: String,
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    #[error("slot {slot} of {name} maps to an empty pixel area")]
    EmptySlot { name: String, slot: u32 },
    #[error("failed to write crop {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Failures of the OCR engine itself (never of recognition quality).
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine unavailable: {message}")]
    Unavailable { message: String },
    #[error("OCR engine failed: {message}")]
    Engine { message: String },
    #[error("failed to prepare region for OCR: {0}")]
    Image(#[from] image::ImageError),
}

impl OcrError {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Segment(#[from] SegmentError),
    #[error(transparent)]
    Ocr(#[from] OcrError),
    #[error("not an entry crop filename: {0}")]
    InvalidEntryFilename(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Fatal errors abort a batch instead of skipping one screenshot.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Ocr(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ocr_errors_are_fatal() {
        let ocr: PipelineError = OcrError::engine("boom").into();
        assert!(ocr.is_fatal());

        let dim: PipelineError = SegmentError::Dimension {
            name: "tiny".to_string(),
            width: 5,
            height: 5,
            min_width: 70,
            min_height: 70,
        }
        .into();
        assert!(!dim.is_fatal());

        assert!(!PipelineError::InvalidEntryFilename("x.png".to_string()).is_fatal());
    }

    #[test]
    fn test_dimension_message() {
        let err = SegmentError::Dimension {
            name: "race1".to_string(),
            width: 20,
            height: 30,
            min_width: 70,
            min_height: 70,
        };
        assert_eq!(err.to_string(), "image race1 is 20x30, minimum is 70x70");
    }
}
