pub mod aggregate;
pub mod calc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use self::aggregate::NutritionReport;

pub fn router() -> Router<AppState> {
    Router::new().route("/meal_plans/:id/nutrition", get(plan_nutrition))
}

#[instrument(skip(state))]
pub async fn plan_nutrition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NutritionReport>, ApiError> {
    let report = aggregate::plan_nutrition(&state.db, id).await?;
    Ok(Json(report))
}
