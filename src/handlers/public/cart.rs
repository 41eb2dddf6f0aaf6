use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::{CartEntry, Collection, DeleteResult, DocumentId, InsertOneResult};
use crate::error::ApiError;

/// POST /addCart - add a copy of a food to the owner's cart
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let Json(payload) = payload?;
    let doc = CartEntry::from_json(payload)?.into_document()?;
    let result = state.store.insert_one(Collection::Cart, doc).await?;
    Ok(Json(result))
}

/// DELETE /addCart/:id - remove one cart entry; deleting twice is not an error
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let result = state.store.delete_by_id(Collection::Cart, id).await?;
    Ok(Json(result))
}
