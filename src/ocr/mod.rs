pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::{OcrEngine, OcrLine, OcrWord, PageSegMode, TesseractCli};
pub use extract::{BandLayout, ExtractMode, ExtractOptions, RawTextRegions, TextExtractor};
pub use preprocess::{NamePreprocess, RelativeRect};
pub use setup::ensure_tessdata;
