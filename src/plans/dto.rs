use serde::{Deserialize, Serialize};
use serde_json::json;
use time::macros::format_description;
use time::Date;
use uuid::Uuid;

use crate::error::ApiError;

use super::repo::PlanWithUser;

pub fn parse_plan_date(raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|_| {
        ApiError::validation_with(
            "invalid date",
            json!({ "date": format!("expected YYYY-MM-DD, got '{raw}'") }),
        )
    })
}

#[derive(Debug, Deserialize)]
pub struct PlansQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub user_id: Option<Uuid>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CopyPlanRequest {
    pub source_plan_id: Option<Uuid>,
    pub target_plan_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: String,
    pub user_name: Option<String>,
}

impl From<PlanWithUser> for PlanResponse {
    fn from(p: PlanWithUser) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            date: p.date.to_string(),
            user_name: p.user_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_plan_date("2025-03-01").unwrap(), date!(2025 - 03 - 01));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(matches!(
            parse_plan_date("01.03.2025").unwrap_err(),
            ApiError::Validation { .. }
        ));
        assert!(parse_plan_date("2025-13-01").is_err());
    }
}
