pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::settings::handlers as settings;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Evaluation API
        .route(
            "/api/v1/evaluations",
            post(evaluation::handle_evaluate).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // History API
        .route(
            "/api/v1/history",
            get(settings::handle_list_history).delete(settings::handle_clear_history),
        )
        .route("/api/v1/history/:id", get(settings::handle_get_history_entry))
        // Settings API
        .route(
            "/api/v1/settings/criteria",
            get(settings::handle_get_criteria).put(settings::handle_put_criteria),
        )
        .route(
            "/api/v1/settings/language",
            get(settings::handle_get_language).put(settings::handle_put_language),
        )
        .route(
            "/api/v1/settings/credential",
            get(settings::handle_get_credential)
                .put(settings::handle_put_credential)
                .delete(settings::handle_delete_credential),
        )
        .with_state(state)
}
