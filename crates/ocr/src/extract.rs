use bonnetje_core::ItemRecord;

use crate::accumulator::LineAccumulator;
use crate::normalize::normalize;

/// Entry point of the text engine: raw OCR text in, numbered items out.
///
/// Holds no state between calls, so independent receipts can be extracted
/// concurrently.
pub struct ExtractionPipeline;

impl ExtractionPipeline {
    /// Extract line items from raw OCR text.
    ///
    /// Never fails: lines that do not yield an item are skipped.
    pub fn extract(raw_text: &str) -> Vec<ItemRecord> {
        let text = normalize(raw_text);
        let mut accumulator = LineAccumulator::new();
        let items: Vec<ItemRecord> = text
            .lines()
            .filter_map(|line| accumulator.push_line(line))
            .collect();

        if !accumulator.pending().is_empty() {
            tracing::trace!(pending = accumulator.pending(), "unpriced text at end of receipt");
        }
        tracing::debug!(items = items.len(), "extracted receipt items");
        items
    }
}

/// Shorthand for [`ExtractionPipeline::extract`].
pub fn extract(raw_text: &str) -> Vec<ItemRecord> {
    ExtractionPipeline::extract(raw_text)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
