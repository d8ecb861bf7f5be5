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
use crate::plans;
use crate::state::AppState;

use super::dto::{
    BlockResponse, BlocksQuery, CreateBlockRequest, UpdateBlockRequest,
};
use super::repo;
use super::services::{self, BlockWrite};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meal_blocks", get(list_blocks).post(create_block))
        .route("/meal_blocks/:id", put(update_block).delete(delete_block))
}

#[instrument(skip(state))]
pub async fn list_blocks(
    State(state): State<AppState>,
    Query(q): Query<BlocksQuery>,
) -> Result<Json<Vec<BlockResponse>>, ApiError> {
    let Some(plan_id) = q.plan_id else {
        return Err(ApiError::validation("plan_id is required"));
    };
    if !plans::repo::exists(&state.db, plan_id).await? {
        return Err(ApiError::NotFound("meal plan"));
    }

    let blocks = repo::list_by_plan(&state.db, plan_id).await?;
    Ok(Json(
        blocks.into_iter().map(BlockResponse::from_block).collect(),
    ))
}

#[instrument(skip(state, body))]
pub async fn create_block(
    State(state): State<AppState>,
    Json(body): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<BlockResponse>), ApiError> {
    let mut missing = serde_json::Map::new();
    if body.plan_id.is_none() {
        missing.insert("plan_id".into(), json!("plan_id is required"));
    }
    if body.block_type.as_deref().map_or(true, str::is_empty) {
        missing.insert("type".into(), json!("type is required"));
    }
    if body.time_start.is_none() {
        missing.insert("time_start".into(), json!("time_start is required"));
    }
    if body.time_end.is_none() {
        missing.insert("time_end".into(), json!("time_end is required"));
    }
    if !missing.is_empty() {
        return Err(ApiError::validation_with(
            "plan_id, type, time_start and time_end are required",
            Value::Object(missing),
        ));
    }
    let (Some(plan_id), Some(block_type), Some(time_start), Some(time_end)) =
        (body.plan_id, body.block_type, body.time_start, body.time_end)
    else {
        return Err(ApiError::validation(
            "plan_id, type, time_start and time_end are required",
        ));
    };

    let write = BlockWrite::new(block_type, &time_start, &time_end)?;

    let block = services::create_block(&state.db, plan_id, write, body.dishes.clone()).await?;
    Ok((
        StatusCode::CREATED,
        Json(BlockResponse::with_dishes(block, body.dishes)),
    ))
}

#[instrument(skip(state, body))]
pub async fn update_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBlockRequest>,
) -> Result<Json<BlockResponse>, ApiError> {
    let mut missing = serde_json::Map::new();
    if body.block_type.as_deref().map_or(true, str::is_empty) {
        missing.insert("type".into(), json!("type is required"));
    }
    if body.time_start.is_none() {
        missing.insert("time_start".into(), json!("time_start is required"));
    }
    if body.time_end.is_none() {
        missing.insert("time_end".into(), json!("time_end is required"));
    }
    if !missing.is_empty() {
        return Err(ApiError::validation_with(
            "type, time_start and time_end are required",
            Value::Object(missing),
        ));
    }
    let (Some(block_type), Some(time_start), Some(time_end)) =
        (body.block_type, body.time_start, body.time_end)
    else {
        return Err(ApiError::validation(
            "type, time_start and time_end are required",
        ));
    };

    let write = BlockWrite::new(block_type, &time_start, &time_end)?;

    let block = services::update_block(&state.db, id, write).await?;
    Ok(Json(BlockResponse::from_block(block)))
}

#[instrument(skip(state))]
pub async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("meal block"));
    }
    Ok(Json(json!({ "message": "meal block deleted" })))
}
