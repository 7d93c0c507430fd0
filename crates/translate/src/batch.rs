use bonnetje_core::ItemRecord;
use serde::Serialize;

use crate::Translator;

/// What happened to one item in a [`TranslationBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationOutcome {
    /// The translator's answer was stored.
    Translated,
    /// The batch failed somewhere; the source name was copied instead.
    Fallback,
    /// Already had a translated name (or nothing to translate); untouched.
    Kept,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationBatch {
    pub items: Vec<ItemRecord>,
    /// One entry per item, same order.
    pub outcomes: Vec<TranslationOutcome>,
    /// First translator error, if any.
    pub failure: Option<String>,
}

impl TranslationBatch {
    pub fn fell_back(&self) -> bool {
        self.failure.is_some()
    }

    pub fn into_items(self) -> Vec<ItemRecord> {
        self.items
    }
}

/// Translate every untranslated item name.
///
/// The translator is not called again after its first failure, and a failed
/// batch falls back uniformly: every item the batch was responsible for,
/// including those translated before the failure, gets its source name as
/// translated name. Failures are logged, never returned.
pub fn translate_items<T: Translator + ?Sized>(
    translator: &T,
    items: &[ItemRecord],
    source_lang: &str,
    target_lang: &str,
) -> TranslationBatch {
    let mut translations: Vec<Option<String>> = Vec::with_capacity(items.len());
    let mut failure: Option<String> = None;

    for item in items {
        if item.is_translated() || item.source_name.is_empty() {
            translations.push(None);
            continue;
        }
        if failure.is_some() {
            translations.push(Some(String::new()));
            continue;
        }
        match translator.translate(&item.source_name, source_lang, target_lang) {
            Ok(text) => translations.push(Some(text)),
            Err(e) => {
                tracing::warn!(row = item.row_number, error = %e, "translation failed, copying source names");
                failure = Some(e.to_string());
                translations.push(Some(String::new()));
            }
        }
    }

    let (items, outcomes) = items
        .iter()
        .zip(translations)
        .map(|(item, translation)| match translation {
            None => (item.clone(), TranslationOutcome::Kept),
            Some(_) if failure.is_some() => (
                item.with_translation(item.source_name.clone()),
                TranslationOutcome::Fallback,
            ),
            Some(text) => (item.with_translation(text), TranslationOutcome::Translated),
        })
        .unzip();

    TranslationBatch { items, outcomes, failure }
}

/// Translate a single text, returning it unchanged when the translator fails.
pub fn translate_text_or_source<T: Translator + ?Sized>(
    translator: &T,
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> String {
    translator
        .translate(text, source_lang, target_lang)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "translation failed, keeping source text");
            text.to_string()
        })
}
