use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::config::StoreBackend;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Readiness plus the configured streak store and default window.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = match state.config.store {
        StoreBackend::Sqlite { .. } => "sqlite",
        StoreBackend::Http { .. } => "http",
    };
    Json(serde_json::json!({
        "status": "ready",
        "store": store,
        "windowDays": state.config.window_days,
    }))
}
