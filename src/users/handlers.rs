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

use super::dto::{UserBody, UserResponse};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = repo::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repo::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<UserBody>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let (Some(name), Some(email)) = (body.name.as_deref(), body.email.as_deref()) else {
        return Err(ApiError::validation("name and email are required"));
    };

    let user = match repo::insert(&state.db, name, email).await {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(ApiError::conflict("a user with this email already exists"));
        }
        Err(e) => return Err(e.into()),
    };
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UserBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let (Some(name), Some(email)) = (body.name.as_deref(), body.email.as_deref()) else {
        return Err(ApiError::validation("name and email are required"));
    };

    let user = match repo::update(&state.db, id, name, email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::NotFound("user")),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(ApiError::conflict("a user with this email already exists"));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("user"));
    }
    Ok(Json(json!({ "message": "user deleted" })))
}
