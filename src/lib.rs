//! UmaTurniej race-standings OCR.
//!
//! Cuts standings screenshots into seven fixed rows, reads position and
//! names from each row with Tesseract and renders a plain-text report.

pub mod config;
pub mod error;
pub mod ocr;
pub mod parse;
pub mod paths;
pub mod pipeline;
pub mod results;
pub mod segment;

pub use config::{AppConfig, load_config};
pub use error::{OcrError, PipelineError, SegmentError};
pub use ocr::{OcrEngine, PageSegMode, TesseractCli};
pub use pipeline::{Pipeline, list_screenshots};
pub use results::{RaceEntry, RaceResult, Report, format_report};
pub use segment::{Screenshot, SlotLayout};
