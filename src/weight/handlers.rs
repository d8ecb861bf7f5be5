use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::macros::format_description;
use time::Date;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use super::repo::{self, WeightEntry};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/weight_history", get(weight_history))
        .route("/weight_history/last", get(last_weight))
}

#[derive(Debug, Deserialize)]
pub struct LastWeightQuery {
    pub user_id: Option<Uuid>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct WeightResponse {
    pub weight: f64,
    pub recorded_at: String,
}

impl From<WeightEntry> for WeightResponse {
    fn from(e: WeightEntry) -> Self {
        Self {
            weight: e.weight,
            recorded_at: e.recorded_at.to_string(),
        }
    }
}

fn parse_date(raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|_| {
        ApiError::validation_with(
            "invalid date",
            json!({ "date": format!("expected YYYY-MM-DD, got '{raw}'") }),
        )
    })
}

#[instrument(skip(state))]
pub async fn last_weight(
    State(state): State<AppState>,
    Query(q): Query<LastWeightQuery>,
) -> Result<Json<WeightResponse>, ApiError> {
    let (Some(user_id), Some(date)) = (q.user_id, q.date.as_deref()) else {
        return Err(ApiError::validation("user_id and date are required"));
    };
    let date = parse_date(date)?;

    let entry = repo::last_before(&state.db, user_id, date)
        .await?
        .ok_or(ApiError::NotFound("weight entry"))?;
    Ok(Json(WeightResponse::from(entry)))
}

#[instrument(skip(state))]
pub async fn weight_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<WeightResponse>>, ApiError> {
    let Some(user_id) = q.user_id else {
        return Err(ApiError::validation("user_id is required"));
    };

    let entries = repo::history(&state.db, user_id).await?;
    Ok(Json(entries.into_iter().map(WeightResponse::from).collect()))
}
