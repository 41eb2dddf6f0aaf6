use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::{
    Collection, Document, DocumentId, FindQuery, FoodItem, FoodUpdate, InsertOneResult,
    Projection, UpdateResult,
};
use crate::error::ApiError;

/// Fields returned by `GET /foods/:id`
const FOOD_DETAIL: Projection = Projection(&["name", "image", "category", "price", "country", "description"]);

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Zero-based page number
    pub page: Option<u64>,
    /// Page size
    pub skip: Option<u64>,
}

impl PageQuery {
    /// Offset `page * size`, limit `size`. Without a size every food is returned.
    pub fn to_find_query(&self) -> FindQuery {
        match self.skip {
            Some(size) => FindQuery::all()
                .skip(self.page.unwrap_or(0).saturating_mul(size))
                .limit(size),
            None => FindQuery::all(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub email: Option<String>,
}

/// GET /foods?page=&skip= - one page of listings in natural order
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let Query(query) = query?;
    let foods = state
        .store
        .find_many(Collection::Foods, query.to_find_query())
        .await?;
    Ok(Json(foods))
}

/// GET /foodsCount - approximate total, for the pager
pub async fn count(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let count = state.store.estimated_count(Collection::Foods).await?;
    Ok(Json(json!({ "count": count })))
}

/// GET /foods/:id - projected detail view; `null` when nothing matches
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let food = state
        .store
        .find_by_id(Collection::Foods, id, FOOD_DETAIL)
        .await?;
    Ok(Json(food))
}

/// GET /userAddFoods?email= - foods contributed by one user
pub async fn list_by_owner(
    State(state): State<AppState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let Query(query) = query?;
    let email = query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Email parameter is required"))?;

    let foods = state
        .store
        .find_many(Collection::Foods, FindQuery::field_eq("userEmail", email))
        .await?;
    Ok(Json(foods))
}

/// POST /foods - add a listing
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let Json(payload) = payload?;
    let doc = FoodItem::from_json(payload)?.into_document()?;
    let result = state.store.insert_one(Collection::Foods, doc).await?;

    tracing::info!(id = %result.inserted_id, "Food added");
    Ok(Json(result))
}

/// PUT /updateFoods/:id - set fields, creating the listing if the id is unknown
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdateResult>, ApiError> {
    let Json(payload) = payload?;
    let id = DocumentId::parse(&id)?;
    let fields = FoodUpdate::from_json(payload)?.into_document()?;

    let result = state
        .store
        .upsert_fields(Collection::Foods, id, fields)
        .await?;
    Ok(Json(result))
}
