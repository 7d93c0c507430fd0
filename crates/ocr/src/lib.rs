//! Receipt scanning: turns OCR text (or a receipt photo, through an
//! [`OcrBackend`]) into numbered line items.
//!
//! The text engine is [`ExtractionPipeline`]: [`normalize`] repairs common
//! OCR misreads, [`PriceMatcher`] finds the price on each line, and
//! [`LineAccumulator`] joins the lines before a price into the item name.

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod accumulator;
pub mod builder;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod preprocess;
pub mod price;
pub mod recognizer;

pub use accumulator::LineAccumulator;
pub use builder::ItemBuilder;
pub use extract::{extract, ExtractionPipeline};
pub use normalize::normalize;
pub use pipeline::{PipelineError, ReceiptPipeline, ScanResult};
pub use preprocess::{prepare_for_ocr, prepare_for_ocr_from_bytes, PreprocessError};
pub use price::PriceMatcher;
pub use recognizer::{default_backend, MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
