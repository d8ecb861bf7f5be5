use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{CreateItemRequest, ItemListEntry, ItemResponse, ItemsQuery, UpdateItemRequest};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meal_items", get(list_items).post(create_item))
        .route("/meal_items/:id", put(update_item).delete(delete_item))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    Query(q): Query<ItemsQuery>,
) -> Result<Json<Vec<ItemListEntry>>, ApiError> {
    let Some(block_id) = q.block_id else {
        return Err(ApiError::validation("block_id is required"));
    };

    let items = repo::list_by_block(&state.db, block_id).await?;
    Ok(Json(items.into_iter().map(ItemListEntry::from).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_item(
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let Some(block_id) = body.block_id else {
        return Err(ApiError::validation("block_id is required"));
    };
    let Some(amount) = body.amount else {
        return Err(ApiError::validation("amount is required"));
    };
    if amount <= 0.0 {
        return Err(ApiError::validation("amount must be positive"));
    }
    if !repo::block_exists(&state.db, block_id).await? {
        return Err(ApiError::NotFound("meal block"));
    }

    let item = repo::insert(
        &state.db,
        block_id,
        body.dish_id,
        amount,
        body.note.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    if body.amount.is_none() && body.note.is_none() {
        return Err(ApiError::validation("nothing to update"));
    }
    if let Some(amount) = body.amount {
        if amount <= 0.0 {
            return Err(ApiError::validation("amount must be positive"));
        }
    }

    let item = repo::update(&state.db, id, body.amount, body.note.as_deref())
        .await?
        .ok_or(ApiError::NotFound("meal item"))?;
    Ok(Json(ItemResponse::from(item)))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("meal item"));
    }
    Ok(Json(json!({ "message": "meal item deleted" })))
}
