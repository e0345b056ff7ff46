use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::orchestrator::Evaluator;
use crate::notify::Notifier;
use crate::settings::history::HistoryLock;
use crate::settings::store::SettingsStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Evaluator,
    /// Settings and history. Redis or in-memory, chosen at startup.
    pub store: Arc<dyn SettingsStore>,
    pub history_lock: HistoryLock,
    pub notifier: Arc<dyn Notifier>,
    pub config: Config,
}
