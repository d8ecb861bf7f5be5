use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{IngredientBody, IngredientResponse};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route(
            "/ingredients/:id",
            axum::routing::put(update_ingredient).delete(delete_ingredient),
        )
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let ingredients = repo::list(&state.db).await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

#[instrument(skip(state, body))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    Json(body): Json<IngredientBody>,
) -> Result<(StatusCode, Json<IngredientResponse>), ApiError> {
    let Some(name) = body.name.as_deref().filter(|n| !n.is_empty()) else {
        return Err(ApiError::validation("name is required"));
    };

    let ingredient = repo::insert(&state.db, name, body.rates()).await?;
    Ok((StatusCode::CREATED, Json(IngredientResponse::from(ingredient))))
}

#[instrument(skip(state, body))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<IngredientBody>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let Some(name) = body.name.as_deref().filter(|n| !n.is_empty()) else {
        return Err(ApiError::validation("name is required"));
    };

    let ingredient = repo::update(&state.db, id, name, body.rates())
        .await?
        .ok_or(ApiError::NotFound("ingredient"))?;
    Ok(Json(IngredientResponse::from(ingredient)))
}

#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("ingredient"));
    }
    Ok(Json(json!({ "message": "ingredient deleted" })))
}
