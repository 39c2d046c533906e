/// Offsec Program - HTTP handlers.
pub mod assets;
pub mod engagements;
pub mod finding_templates;
pub mod findings;
pub mod intake;
pub mod reports;
pub mod timeline_comments;
pub mod users;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::AppState;
use crate::db::get_connection;

/// Health check: 200 when a pooled database connection can be obtained.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match get_connection(&state.db_pool).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded" })),
            )
        }
    }
}
