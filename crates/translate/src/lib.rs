pub mod batch;
pub mod http;

pub use batch::{translate_items, translate_text_or_source, TranslationBatch, TranslationOutcome};
pub use http::LibreTranslateClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Cannot reach translation service at {0}")]
    Connection(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Translation service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("Unexpected translation response: {0}")]
    ResponseParsing(String),
    #[error("Translation service returned an empty translation")]
    Empty,
}

/// Maps an item name from one language to another.
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        (**self).translate(text, source_lang, target_lang)
    }
}
