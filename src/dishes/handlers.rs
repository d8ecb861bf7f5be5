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

use super::dto::{DishBody, DishDetails};
use super::repo::{self, DishWrite};
use super::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dishes", get(list_dishes).post(create_dish))
        .route(
            "/dishes/:id",
            get(get_dish).put(update_dish).delete(delete_dish),
        )
}

fn dish_write(body: &DishBody) -> Result<(DishWrite, Vec<String>), ApiError> {
    let name = body
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let meal_times = body.meal_times.clone().filter(|mt| !mt.is_empty());
    let (Some(name), Some(meal_times)) = (name, meal_times) else {
        return Err(ApiError::validation("name and meal_times are required"));
    };

    let write = DishWrite {
        name,
        calories_per_100: body.calories_per_100,
        proteins_per_100: body.proteins_per_100,
        fats_per_100: body.fats_per_100,
        carbs_per_100: body.carbs_per_100,
        unit: body.unit.clone().unwrap_or_else(|| "г".to_string()),
        instruction: body.instruction.clone(),
        // An empty string means "no video", not an empty link.
        video_url: body.video_url.clone().filter(|v| !v.is_empty()),
        image_url: body.image_url.clone().filter(|v| !v.is_empty()),
    };
    Ok((write, meal_times))
}

#[instrument(skip(state))]
pub async fn list_dishes(
    State(state): State<AppState>,
) -> Result<Json<Vec<DishDetails>>, ApiError> {
    let dishes = services::list_details(&state.db).await?;
    Ok(Json(dishes))
}

#[instrument(skip(state))]
pub async fn get_dish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DishDetails>, ApiError> {
    let dish = services::get_details(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("dish"))?;
    Ok(Json(dish))
}

#[instrument(skip(state, body))]
pub async fn create_dish(
    State(state): State<AppState>,
    Json(body): Json<DishBody>,
) -> Result<(StatusCode, Json<DishDetails>), ApiError> {
    let (write, meal_times) = dish_write(&body)?;
    let dish = services::create_dish(&state.db, write, meal_times, body.ingredients).await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

#[instrument(skip(state, body))]
pub async fn update_dish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<DishBody>,
) -> Result<Json<DishDetails>, ApiError> {
    let (write, meal_times) = dish_write(&body)?;
    let dish = services::update_dish(&state.db, id, write, meal_times, body.ingredients).await?;
    Ok(Json(dish))
}

#[instrument(skip(state))]
pub async fn delete_dish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("dish"));
    }
    Ok(Json(json!({ "message": "dish deleted" })))
}
