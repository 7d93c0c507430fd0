use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bonnetje_core::{ItemDraft, ItemRecord, ItemSheet, Money};
use bonnetje_ocr::ExtractionPipeline;
use bonnetje_storage::{
    ExpenseSummary, MonthlyTotal, ReceiptFilter, ReceiptRow, ReceiptSummary,
};
use bonnetje_translate::{translate_items, TranslationOutcome};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let upload_limit = state.settings.server.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/api/categories", get(categories))
        .route("/api/extract", post(extract))
        .route("/api/scan", post(scan).layer(DefaultBodyLimit::max(upload_limit)))
        .route("/api/receipts", get(list_receipts).post(create_receipt))
        .route("/api/receipts/export", get(export_receipts))
        .route("/api/receipts/{id}", get(receipt_detail))
        .route("/api/stores", get(stores))
        .route("/api/summary", get(summary))
        .route("/api/reports/monthly", get(monthly_report))
        .with_state(state)
}

// ── Extraction ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    #[serde(default)]
    pub translate: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanParams {
    #[serde(default)]
    pub translate: bool,
}

#[derive(Debug, Serialize)]
pub struct TranslationReport {
    pub outcomes: Vec<TranslationOutcome>,
    pub failure: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    pub items: Vec<ItemRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationReport>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.settings.categories.clone())
}

async fn extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let items = ExtractionPipeline::extract(&req.text);
    let (items, translation) = maybe_translate(&state, items, req.translate).await?;
    Ok(Json(ItemsResponse { ocr_text: None, items, translation }))
}

/// Upload a receipt photo as the raw request body.
async fn scan(
    State(state): State<AppState>,
    Query(params): Query<ScanParams>,
    body: Bytes,
) -> Result<Json<ItemsResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty image body".into()));
    }
    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.process_bytes(&body)).await??;

    let (items, translation) = maybe_translate(&state, result.items, params.translate).await?;
    Ok(Json(ItemsResponse { ocr_text: Some(result.ocr_text), items, translation }))
}

async fn maybe_translate(
    state: &AppState,
    items: Vec<ItemRecord>,
    translate: bool,
) -> Result<(Vec<ItemRecord>, Option<TranslationReport>), ApiError> {
    if !translate || items.is_empty() {
        return Ok((items, None));
    }
    let translator = state
        .translator
        .clone()
        .ok_or_else(|| ApiError::Unavailable("no translation service configured".into()))?;
    let source = state.settings.translation.source_lang.clone();
    let target = state.settings.translation.target_lang.clone();

    let batch = tokio::task::spawn_blocking(move || {
        translate_items(translator.as_ref(), &items, &source, &target)
    })
    .await?;

    let report = TranslationReport { outcomes: batch.outcomes.clone(), failure: batch.failure.clone() };
    Ok((batch.into_items(), Some(report)))
}

// ── Receipts ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveReceiptRequest {
    pub store_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub items: Vec<ItemDraft>,
}

#[derive(Debug, Serialize)]
pub struct SavedReceipt {
    pub id: i64,
    pub total: Money,
}

#[derive(Debug, Serialize)]
pub struct ReceiptDetail {
    #[serde(flatten)]
    pub receipt: ReceiptSummary,
    pub items: Vec<ItemRecord>,
}

async fn create_receipt(
    State(state): State<AppState>,
    Json(req): Json<SaveReceiptRequest>,
) -> Result<(StatusCode, Json<SavedReceipt>), ApiError> {
    let store_name = req.store_name.trim();
    if store_name.is_empty() {
        return Err(ApiError::BadRequest("store_name is required".into()));
    }

    let mut sheet = ItemSheet::default();
    for (index, draft) in req.items.into_iter().enumerate() {
        sheet.push(draft).map_err(|e| ApiError::from_sheet(index, e))?;
    }

    let id = bonnetje_storage::save_receipt(&state.db, store_name, req.date, sheet.items()).await?;
    Ok((StatusCode::CREATED, Json(SavedReceipt { id, total: sheet.total() })))
}

async fn list_receipts(
    State(state): State<AppState>,
    Query(filter): Query<ReceiptFilter>,
) -> Result<Json<Vec<ReceiptRow>>, ApiError> {
    Ok(Json(bonnetje_storage::get_filtered_receipts(&state.db, &filter).await?))
}

async fn export_receipts(
    State(state): State<AppState>,
    Query(filter): Query<ReceiptFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = bonnetje_storage::get_filtered_receipts(&state.db, &filter).await?;
    let mut csv = Vec::new();
    bonnetje_export::export_rows(&mut csv, &rows)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"receipts.csv\""),
        ],
        csv,
    ))
}

async fn receipt_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReceiptDetail>, ApiError> {
    let receipt = bonnetje_storage::get_receipt(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("receipt {id}")))?;
    let items = bonnetje_storage::get_receipt_items(&state.db, id).await?;
    Ok(Json(ReceiptDetail { receipt, items }))
}

async fn stores(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(bonnetje_storage::get_all_stores(&state.db).await?))
}

async fn summary(State(state): State<AppState>) -> Result<Json<ExpenseSummary>, ApiError> {
    Ok(Json(bonnetje_storage::get_expense_summary(&state.db).await?))
}

async fn monthly_report(State(state): State<AppState>) -> Result<Json<Vec<MonthlyTotal>>, ApiError> {
    Ok(Json(bonnetje_storage::get_monthly_report(&state.db).await?))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
