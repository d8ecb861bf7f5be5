use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{parse_plan_date, CopyPlanRequest, CreatePlanRequest, PlanResponse, PlansQuery};
use super::{repo, services};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meal_plans", get(list_plans).post(create_plan))
        .route("/meal_plans/copy", post(copy_plan))
        .route("/meal_plans/:id", get(get_plan).delete(delete_plan))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    Query(q): Query<PlansQuery>,
) -> Result<Json<Vec<PlanResponse>>, ApiError> {
    let plans = repo::list(&state.db, q.user_id).await?;
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanResponse>, ApiError> {
    let plan = repo::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("meal plan"))?;
    Ok(Json(PlanResponse::from(plan)))
}

#[instrument(skip(state, body))]
pub async fn create_plan(
    State(state): State<AppState>,
    Json(body): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(user_id), Some(date)) = (body.user_id, body.date.as_deref()) else {
        return Err(ApiError::validation("user_id and date are required"));
    };
    let date = parse_plan_date(date)?;

    // One plan per (user, date). The UNIQUE constraint backs this up if two
    // requests race past the check.
    if repo::find_by_user_date(&state.db, user_id, date)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("a plan for this date already exists"));
    }

    let plan = match repo::insert(&state.db, user_id, date).await {
        Ok(plan) => plan,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(ApiError::conflict("a plan for this date already exists"));
        }
        Err(e) => return Err(e.into()),
    };
    Ok((StatusCode::CREATED, Json(json!({ "id": plan.id }))))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("meal plan"));
    }
    Ok(Json(json!({ "message": "meal plan deleted" })))
}

#[instrument(skip(state, body))]
pub async fn copy_plan(
    State(state): State<AppState>,
    Json(body): Json<CopyPlanRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(source), Some(target)) = (body.source_plan_id, body.target_plan_id) else {
        return Err(ApiError::validation(
            "source_plan_id and target_plan_id are required",
        ));
    };

    services::copy_plan(&state.db, source, target).await?;
    Ok(Json(json!({ "id": target, "message": "plan copied" })))
}
