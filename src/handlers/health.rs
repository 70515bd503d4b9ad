use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

/// Liveness probe. Reports "degraded" when the database does not answer.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    let status = if database == "up" { "up" } else { "degraded" };

    Json(json!({
        "status": status,
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
