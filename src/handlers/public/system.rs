use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - liveness text
pub async fn root() -> &'static str {
    "Bangla Restaurant Server is Running"
}

/// GET /health - liveness plus a store ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check ping failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}
