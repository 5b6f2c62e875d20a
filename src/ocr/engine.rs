use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::setup::{TesseractPaths, find_tessdata_dir_for, find_tesseract_executable};
use crate::error::OcrError;

/// Tesseract page segmentation mode (`--psm`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSegMode(pub u8);

impl PageSegMode {
    /// Assume a single uniform block of text
    pub const BLOCK: PageSegMode = PageSegMode(6);
    /// Treat the image as a single text line
    pub const SINGLE_LINE: PageSegMode = PageSegMode(7);
    /// Treat the image as a single word
    pub const SINGLE_WORD: PageSegMode = PageSegMode(8);
    /// Find as much text as possible in no particular order
    pub const SPARSE: PageSegMode = PageSegMode(11);
}

impl fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recognized word with its confidence (0-100).
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub confidence: f32,
}

/// One line of recognized words, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub words: Vec<OcrWord>,
    /// Mean word confidence
    pub confidence: f32,
}

impl OcrLine {
    fn from_words(words: Vec<OcrWord>) -> Self {
        let confidence = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32
        };
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            words,
            confidence,
        }
    }
}

/// Anything that can turn a region image into plain text.
///
/// Implementations must be stateless between calls: the pipeline may call
/// `recognize` for several slots at once.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &GrayImage, mode: PageSegMode) -> Result<String, OcrError>;

    /// Word-level recognition with confidences.
    ///
    /// Engines without confidence output report every word at 100.
    fn recognize_words(
        &self,
        image: &GrayImage,
        mode: PageSegMode,
    ) -> Result<Vec<OcrLine>, OcrError> {
        let text = self.recognize(image, mode)?;
        Ok(text
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .map(|word| OcrWord {
                        text: word.to_string(),
                        confidence: 100.0,
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .map(OcrLine::from_words)
            .collect())
    }
}

/// Runs the `tesseract` executable once per region.
///
/// Every call gets its own temporary input file, so concurrent calls do not
/// share any state.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    language: String,
}

impl TesseractCli {
    pub fn new(paths: TesseractPaths, language: impl Into<String>) -> Self {
        Self {
            executable: paths.executable,
            tessdata: paths.tessdata,
            language: language.into(),
        }
    }

    /// Locates Tesseract on this machine.
    ///
    /// A missing executable is an [`OcrError::Unavailable`]; a missing
    /// tessdata directory is tolerated and left to Tesseract's own lookup.
    pub fn discover(language: impl Into<String>) -> Result<Self, OcrError> {
        let language = language.into();
        let executable = find_tesseract_executable()?;
        let tessdata = find_tessdata_dir_for(&language).ok();
        Ok(Self::new(TesseractPaths { executable, tessdata }, language))
    }
}

impl TesseractCli {
    /// Runs Tesseract on `image` and returns its stdout. With `tsv` set the
    /// output is Tesseract's TSV table instead of plain text.
    fn run(&self, image: &GrayImage, mode: PageSegMode, tsv: bool) -> Result<String, OcrError> {
        let temp_input = NamedTempFile::with_suffix(".png")
            .map_err(|e| OcrError::engine(format!("failed to create temp file: {}", e)))?;
        image.save_with_format(temp_input.path(), image::ImageFormat::Png)?;

        let mut command = Command::new(&self.executable);
        command
            .arg(temp_input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(mode.to_string());
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        // Config file names go last
        if tsv {
            command.arg("tsv");
        }

        let output = command.output().map_err(|e| {
            OcrError::unavailable(format!(
                "could not run {}: {}",
                self.executable.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &GrayImage, mode: PageSegMode) -> Result<String, OcrError> {
        self.run(image, mode, false)
    }

    fn recognize_words(
        &self,
        image: &GrayImage,
        mode: PageSegMode,
    ) -> Result<Vec<OcrLine>, OcrError> {
        let tsv = self.run(image, mode, true)?;
        Ok(parse_tsv_output(&tsv))
    }
}

/// Groups the word rows of Tesseract's TSV output into lines.
///
/// TSV fields: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Only level 5 rows are words.
fn parse_tsv_output(tsv: &str) -> Vec<OcrLine> {
    let mut lines = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut current_words: Vec<OcrWord> = Vec::new();

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = fields[0].parse().unwrap_or(-1);
        let text = fields[11].trim();
        if level != 5 || text.is_empty() {
            continue;
        }

        // line_num restarts in every block and paragraph
        let key = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );
        if current_key != Some(key) && !current_words.is_empty() {
            lines.push(OcrLine::from_words(std::mem::take(&mut current_words)));
        }
        current_key = Some(key);

        let confidence: f32 = fields[10].parse().unwrap_or(-1.0);
        if confidence >= 0.0 {
            current_words.push(OcrWord {
                text: text.to_string(),
                confidence,
            });
        }
    }

    if !current_words.is_empty() {
        lines.push(OcrLine::from_words(current_words));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_psm_renders_as_number() {
        assert_eq!(PageSegMode::SINGLE_LINE.to_string(), "7");
        assert_eq!(PageSegMode::SPARSE.to_string(), "11");
    }

    const TSV_HEADER: &str = concat!(
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\t",
        "left\ttop\twidth\theight\tconf\ttext"
    );

    fn word_row(block: u32, line: u32, word: u32, conf: &str, text: &str) -> String {
        format!("5\t1\t{}\t1\t{}\t{}\t0\t0\t10\t10\t{}\t{}", block, line, word, conf, text)
    }

    #[test]
    fn test_parse_tsv_groups_words_into_lines() {
        let tsv = [
            TSV_HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t200\t40\t-1\t".to_string(),
            "4\t1\t1\t1\t1\t0\t0\t0\t200\t20\t-1\t".to_string(),
            word_row(1, 1, 1, "91.5", "Haru"),
            word_row(1, 1, 2, "88.5", "Urara"),
            word_row(1, 2, 1, "95", "Sebaxd321"),
        ]
        .join("\n");

        let lines = parse_tsv_output(&tsv);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Haru Urara");
        assert_eq!(lines[0].words[1].confidence, 88.5);
        assert_eq!(lines[0].confidence, 90.0);
        assert_eq!(lines[1].text, "Sebaxd321");
    }

    #[test]
    fn test_parse_tsv_splits_same_line_number_across_blocks() {
        let tsv = [
            TSV_HEADER.to_string(),
            word_row(1, 1, 1, "90", "Maruzensky"),
            word_row(2, 1, 1, "80", "Kysix"),
        ]
        .join("\n");

        let lines = parse_tsv_output(&tsv);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Maruzensky", "Kysix"]);
    }

    #[test]
    fn test_parse_tsv_skips_blank_and_short_rows() {
        let tsv = [
            TSV_HEADER.to_string(),
            word_row(1, 1, 1, "95", "   "),
            "5\t1\t1".to_string(),
            word_row(1, 1, 2, "70", "Vodka"),
        ]
        .join("\n");

        let lines = parse_tsv_output(&tsv);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].words.len(), 1);
        assert_eq!(lines[0].text, "Vodka");
    }

    #[test]
    fn test_default_word_recognition_splits_text() {
        struct PlainEngine;

        impl OcrEngine for PlainEngine {
            fn recognize(&self, _: &GrayImage, _: PageSegMode) -> Result<String, OcrError> {
                Ok("Haru  Urara\n\n Sebaxd321 \n".to_string())
            }
        }

        let img = GrayImage::from_pixel(4, 4, Luma([0]));
        let lines = PlainEngine.recognize_words(&img, PageSegMode::BLOCK).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Haru Urara");
        assert!(lines[1].words.iter().all(|w| w.confidence == 100.0));
    }

    #[test]
    fn test_missing_executable_is_unavailable() {
        let engine = TesseractCli::new(
            TesseractPaths {
                executable: PathBuf::from("/nonexistent/tesseract-binary"),
                tessdata: None,
            },
            "eng",
        );
        let img = GrayImage::from_pixel(10, 10, Luma([255]));

        match engine.recognize(&img, PageSegMode::BLOCK) {
            Err(OcrError::Unavailable { .. }) => {}
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[test]
    #[ignore] // Requires a local Tesseract install
    fn test_recognize_blank_image() {
        let engine = TesseractCli::discover("eng").unwrap();
        let blank = GrayImage::from_pixel(100, 50, Luma([255]));

        let result = engine.recognize(&blank, PageSegMode::SINGLE_LINE);
        assert!(result.is_ok(), "Recognition should succeed even on blank image");
        assert!(result.unwrap().trim().is_empty());
    }
}
