use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub email: Option<String>,
}

/// POST /jwt - issue a session token for the posted identity
///
/// The token goes back only as an `HttpOnly` cookie; the body is just
/// `{"success": true}`.
pub async fn issue(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let email = payload
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let issued = state.tokens.issue(&email).map_err(|e| {
        tracing::error!("Failed to issue session token: {}", e);
        ApiError::internal_server_error("Failed to create session")
    })?;

    tracing::info!(user = %email, "Session issued");
    Ok(([(header::SET_COOKIE, issued.cookie)], Json(json!({ "success": true }))))
}

/// POST /logOut - tell the browser to drop the session cookie
///
/// Tokens are stateless, so this cannot invalidate a token held elsewhere.
pub async fn log_out(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let user = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    tracing::info!(user = %user, "Logging out");

    ([(header::SET_COOKIE, state.tokens.revoke())], Json(json!({ "success": true })))
}
