use axum::{extract::State, Extension, Json};

use crate::app::AppState;
use crate::database::{Collection, Document, FindQuery};
use crate::error::ApiError;
use crate::middleware::VerifiedIdentity;

/// GET /addCart?email= - the signed-in user's cart entries
pub async fn list(
    State(state): State<AppState>,
    Extension(VerifiedIdentity(email)): Extension<VerifiedIdentity>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let entries = state
        .store
        .find_many(Collection::Cart, FindQuery::field_eq("userEmail", email))
        .await?;
    Ok(Json(entries))
}
