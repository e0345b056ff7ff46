//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{debug, error};

use crate::errors::AppError;
use crate::evaluation::criteria::RawCriteria;
use crate::evaluation::document::Document;
use crate::evaluation::request::Language;
use crate::settings::history::{self, HistoryEntry};
use crate::settings::store::{load_credential, load_criteria, load_language};
use crate::state::AppState;

const DEFAULT_FILENAME: &str = "resume.pdf";

/// Fields accepted by `POST /api/v1/evaluations`.
#[derive(Default)]
struct EvaluationUpload {
    document: Option<Document>,
    criteria: Option<RawCriteria>,
    language: Option<Language>,
    replace_latest: bool,
}

/// POST /api/v1/evaluations
///
/// Multipart fields: `document` (file, required), `criteria` (JSON, optional),
/// `language` (optional), `replace_latest` (optional bool).
/// Missing criteria and language fall back to the saved settings.
/// The result is added to history and returned as the stored history entry.
/// With `replace_latest` the newest entry keeps its id and only its result changes.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<HistoryEntry>, AppError> {
    let upload = read_upload(multipart).await?;
    let store = state.store.as_ref();

    let document = upload
        .document
        .ok_or_else(|| AppError::BadRequest("missing 'document' file field".to_string()))?;
    let criteria = match upload.criteria {
        Some(criteria) => criteria,
        None => load_criteria(store).await?,
    };
    let language = match upload.language {
        Some(language) => language,
        None => load_language(store).await?,
    };
    let credential = load_credential(store)
        .await?
        .or_else(|| state.config.default_credential.clone());

    let result = state
        .evaluator
        .evaluate(&document, &criteria, credential.as_deref(), language)
        .await?;

    let entry = HistoryEntry::new(document.filename.clone(), result);
    let saved = if upload.replace_latest {
        history::replace_latest(store, &state.history_lock, entry.clone()).await
    } else {
        history::record(store, &state.history_lock, entry.clone()).await
    };

    // The evaluation already succeeded; a failed history write only loses the entry.
    match saved {
        Ok(stored) => Ok(Json(stored)),
        Err(e) => {
            error!("Failed to save evaluation of '{}' to history: {e}", entry.document_reference);
            Ok(Json(entry))
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<EvaluationUpload, AppError> {
    let bad = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.to_string());
    let mut upload = EvaluationUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document" => {
                let filename = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_FILENAME)
                    .to_string();
                let bytes = field.bytes().await.map_err(bad)?;
                upload.document = Some(Document::from_bytes(filename, bytes));
            }
            "criteria" => {
                let text = field.text().await.map_err(bad)?;
                let criteria = serde_json::from_str(&text)
                    .map_err(|e| AppError::BadRequest(format!("invalid criteria JSON: {e}")))?;
                upload.criteria = Some(criteria);
            }
            "language" => {
                let text = field.text().await.map_err(bad)?;
                upload.language = Some(text.parse().map_err(AppError::BadRequest)?);
            }
            "replace_latest" => {
                let text = field.text().await.map_err(bad)?;
                upload.replace_latest = text.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("replace_latest must be true or false, got '{text}'"))
                })?;
            }
            other => debug!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    Ok(upload)
}
