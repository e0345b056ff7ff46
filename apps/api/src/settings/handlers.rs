use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::criteria::RawCriteria;
use crate::evaluation::request::Language;
use crate::settings::history::{self, HistoryEntry};
use crate::settings::store::{
    keys, load_credential, load_criteria, load_language, save_json, save_language,
};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageSetting {
    pub language: Language,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialUpdate {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct CredentialStatus {
    /// Whether an evaluation would have a credential. The key itself is never returned.
    pub configured: bool,
    pub saved: bool,
}

/// GET /api/v1/settings/criteria
pub async fn handle_get_criteria(
    State(state): State<AppState>,
) -> Result<Json<RawCriteria>, AppError> {
    Ok(Json(load_criteria(state.store.as_ref()).await?))
}

/// PUT /api/v1/settings/criteria
///
/// Stores the form state as-is. Blank rows are allowed here; they are only
/// rejected when an evaluation runs.
pub async fn handle_put_criteria(
    State(state): State<AppState>,
    Json(criteria): Json<RawCriteria>,
) -> Result<Json<RawCriteria>, AppError> {
    save_json(state.store.as_ref(), keys::CRITERIA, &criteria).await?;
    state.notifier.notify_success("Criteria saved");
    Ok(Json(criteria))
}

/// GET /api/v1/settings/language
pub async fn handle_get_language(
    State(state): State<AppState>,
) -> Result<Json<LanguageSetting>, AppError> {
    let language = load_language(state.store.as_ref()).await?;
    Ok(Json(LanguageSetting { language }))
}

/// PUT /api/v1/settings/language
pub async fn handle_put_language(
    State(state): State<AppState>,
    Json(setting): Json<LanguageSetting>,
) -> Result<Json<LanguageSetting>, AppError> {
    save_language(state.store.as_ref(), setting.language).await?;
    state.notifier.notify_success("Language updated");
    Ok(Json(setting))
}

/// GET /api/v1/settings/credential
pub async fn handle_get_credential(
    State(state): State<AppState>,
) -> Result<Json<CredentialStatus>, AppError> {
    let saved = load_credential(state.store.as_ref()).await?.is_some();
    Ok(Json(CredentialStatus {
        configured: saved || state.config.default_credential.is_some(),
        saved,
    }))
}

/// PUT /api/v1/settings/credential
pub async fn handle_put_credential(
    State(state): State<AppState>,
    Json(update): Json<CredentialUpdate>,
) -> Result<StatusCode, AppError> {
    let api_key = update.api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::BadRequest("apiKey cannot be empty".to_string()));
    }
    state.store.set(keys::CREDENTIAL, api_key).await?;
    state.notifier.notify_success("API key saved");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/settings/credential
pub async fn handle_delete_credential(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.store.remove(keys::CREDENTIAL).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/history
pub async fn handle_list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    Ok(Json(history::load(state.store.as_ref()).await?))
}

/// GET /api/v1/history/:id
pub async fn handle_get_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryEntry>, AppError> {
    history::find(state.store.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("History entry {id} not found")))
}

/// DELETE /api/v1/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    history::clear(state.store.as_ref(), &state.history_lock).await?;
    state.notifier.notify_success("History cleared");
    Ok(StatusCode::NO_CONTENT)
}
