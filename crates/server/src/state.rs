use bonnetje_core::Settings;
use bonnetje_ocr::{default_backend, OcrBackend, ReceiptPipeline};
use bonnetje_storage::DbPool;
use bonnetje_translate::{LibreTranslateClient, TranslationError, Translator};
use std::sync::Arc;

pub type ScanPipeline = ReceiptPipeline<Box<dyn OcrBackend>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub pipeline: Arc<ScanPipeline>,
    /// `None` when no translation endpoint is configured.
    pub translator: Option<Arc<dyn Translator>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub async fn from_settings(settings: Settings, db: DbPool) -> Result<Self, TranslationError> {
        let pipeline = Arc::new(ReceiptPipeline::new(default_backend(&settings.ocr)));

        // The blocking HTTP client owns its own runtime thread; build it off
        // the async executor.
        let translation = settings.translation.clone();
        let translator = tokio::task::spawn_blocking(move || {
            LibreTranslateClient::from_settings(&translation)
        })
        .await
        .map_err(|e| TranslationError::HttpClient(e.to_string()))??
        .map(|client| Arc::new(client) as Arc<dyn Translator>);

        if translator.is_none() {
            tracing::info!("no translation endpoint configured; translation disabled");
        }

        Ok(Self { db, pipeline, translator, settings: Arc::new(settings) })
    }
}
