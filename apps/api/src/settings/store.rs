//! Key/value store for user settings and scan history.
//!
//! `RedisStore` when `REDIS_URL` is configured, `MemoryStore` otherwise.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

use crate::evaluation::criteria::RawCriteria;
use crate::evaluation::request::Language;

/// Keys under which settings are persisted.
pub mod keys {
    pub const CREDENTIAL: &str = "evaluator_api_key";
    pub const HISTORY: &str = "resume_history";
    pub const LANGUAGE: &str = "preferred_language";
    pub const CRITERIA: &str = "resume_criteria";
}

const REDIS_PREFIX: &str = "screener:";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Backends
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Redis-backed store. Keys are namespaced under `screener:`.
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn open(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
        })
    }

    fn namespaced(key: &str) -> String {
        format!("{REDIS_PREFIX}{key}")
    }
}

#[async_trait]
impl SettingsStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(Self::namespaced(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(Self::namespaced(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(Self::namespaced(key)).await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typed helpers
// ────────────────────────────────────────────────────────────────────────────

/// Reads a JSON value. A stored value that no longer decodes is logged and
/// treated as absent.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn SettingsStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Ignoring unreadable value stored under '{key}': {e}");
            Ok(None)
        }
    }
}

pub async fn save_json<T: Serialize>(
    store: &dyn SettingsStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

pub async fn load_credential(store: &dyn SettingsStore) -> Result<Option<String>, StoreError> {
    Ok(store
        .get(keys::CREDENTIAL)
        .await?
        .filter(|c| !c.trim().is_empty()))
}

/// Saved language preference, English when unset or unrecognized.
pub async fn load_language(store: &dyn SettingsStore) -> Result<Language, StoreError> {
    Ok(store
        .get(keys::LANGUAGE)
        .await?
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default())
}

pub async fn save_language(store: &dyn SettingsStore, language: Language) -> Result<(), StoreError> {
    store.set(keys::LANGUAGE, language.as_str()).await
}

/// Saved criteria form state, or the blank form defaults.
pub async fn load_criteria(store: &dyn SettingsStore) -> Result<RawCriteria, StoreError> {
    Ok(load_json(store, keys::CRITERIA).await?.unwrap_or_default())
}
