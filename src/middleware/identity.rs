use axum::{
    extract::{Query, Request},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use super::auth::SessionUser;
use crate::error::ApiError;

/// Identity that passed both gates; handlers scope their queries by it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedIdentity(pub String);

#[derive(Debug, Deserialize)]
struct IdentityQuery {
    email: Option<String>,
}

/// Identity gate: the session owner must be the `email` the caller asked for.
///
/// Runs after [`super::session_auth_middleware`].
pub async fn identity_match_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session_user = request
        .extensions()
        .get::<SessionUser>()
        .cloned()
        .ok_or_else(ApiError::unauthorized)?;

    let requested = Query::<IdentityQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.email)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| ApiError::bad_request("Email parameter is required"))?;

    if session_user.email != requested {
        tracing::warn!(owner = %session_user.email, requested = %requested, "Identity mismatch");
        return Err(ApiError::forbidden());
    }

    request.extensions_mut().insert(VerifiedIdentity(requested));
    Ok(next.run(request).await)
}
