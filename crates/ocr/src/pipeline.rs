use bonnetje_core::ItemRecord;
use std::path::Path;
use thiserror::Error;

use crate::extract::ExtractionPipeline;
use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of scanning one receipt image.
#[derive(Debug)]
pub struct ScanResult {
    /// Raw OCR text output, before normalization.
    pub ocr_text: String,
    /// Line items extracted from the OCR text.
    pub items: Vec<ItemRecord>,
}

/// Orchestrates: preprocess → OCR → extract.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ScanResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }

    /// Process raw bytes (from camera capture, upload or file read).
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn process_bytes(&self, data: &[u8]) -> Result<ScanResult, PipelineError> {
        let image_bytes = preprocess::prepare_for_ocr_from_bytes(data)?;
        let ocr_text = self.recognizer.recognize(&image_bytes)?;
        let items = ExtractionPipeline::extract(&ocr_text);
        tracing::info!(items = items.len(), chars = ocr_text.len(), "receipt scanned");
        Ok(ScanResult { ocr_text, items })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
