//! Scan history: past evaluations, newest first, stored as one JSON array.
//!
//! Every change is a read-modify-write of the whole array, so writers hold a
//! `HistoryLock` across the load and the save.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::evaluation::result::ResumeAnalysisResult;
use crate::settings::store::{keys, load_json, save_json, SettingsStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Filename the document was uploaded with.
    pub document_reference: String,
    pub result: ResumeAnalysisResult,
}

impl HistoryEntry {
    pub fn new(document_reference: impl Into<String>, result: ResumeAnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            document_reference: document_reference.into(),
            result,
        }
    }
}

/// Serializes writers of the history array within this process.
#[derive(Debug, Clone, Default)]
pub struct HistoryLock(Arc<Mutex<()>>);

pub async fn load(store: &dyn SettingsStore) -> Result<Vec<HistoryEntry>, StoreError> {
    Ok(load_json(store, keys::HISTORY).await?.unwrap_or_default())
}

pub async fn find(store: &dyn SettingsStore, id: &str) -> Result<Option<HistoryEntry>, StoreError> {
    Ok(load(store).await?.into_iter().find(|e| e.id == id))
}

/// Prepends `entry` and returns it as stored.
pub async fn record(
    store: &dyn SettingsStore,
    lock: &HistoryLock,
    entry: HistoryEntry,
) -> Result<HistoryEntry, StoreError> {
    let _guard = lock.0.lock().await;
    let mut history = load(store).await?;
    history.insert(0, entry.clone());
    save_json(store, keys::HISTORY, &history).await?;
    Ok(entry)
}

/// Swaps the result of the newest entry for `entry.result` (last write wins).
/// The newest entry keeps its id, timestamp and document reference. Records
/// `entry` when history is empty. Returns the entry as stored.
pub async fn replace_latest(
    store: &dyn SettingsStore,
    lock: &HistoryLock,
    entry: HistoryEntry,
) -> Result<HistoryEntry, StoreError> {
    let _guard = lock.0.lock().await;
    let mut history = load(store).await?;
    let stored = match history.first_mut() {
        Some(latest) => {
            latest.result = entry.result;
            latest.clone()
        }
        None => {
            history.push(entry.clone());
            entry
        }
    };
    save_json(store, keys::HISTORY, &history).await?;
    Ok(stored)
}

pub async fn clear(store: &dyn SettingsStore, lock: &HistoryLock) -> Result<(), StoreError> {
    let _guard = lock.0.lock().await;
    store.remove(keys::HISTORY).await
}
