use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::SESSION_COOKIE;
use crate::error::ApiError;

/// Identity proven by a valid session cookie
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub email: String,
}

/// Session gate: the request must carry a `token` cookie that verifies.
///
/// Both a missing cookie and a bad token yield the same generic 401.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    tracing::info!(method = %request.method(), path = %request.uri().path(), "Gated request");

    let token = extract_session_cookie(request.headers()).ok_or_else(|| {
        tracing::warn!("Rejected request without session cookie");
        ApiError::unauthorized()
    })?;

    let claims = state.tokens.verify(&token).map_err(|_| {
        tracing::warn!("Rejected request with invalid or expired session token");
        ApiError::unauthorized()
    })?;

    tracing::debug!(owner = %claims.email, "Session token verified");
    request.extensions_mut().insert(SessionUser { email: claims.email });

    Ok(next.run(request).await)
}

/// Pull the session token out of the `Cookie` header(s)
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|c| c.trim().strip_prefix(prefix.as_str()))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}
