use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::Block;
use super::services::format_time_of_day;

#[derive(Debug, Deserialize)]
pub struct BlocksQuery {
    pub plan_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlockItem {
    pub dish_id: Option<Uuid>,
    pub amount: f64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub plan_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    #[serde(default)]
    pub dishes: Vec<NewBlockItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlockRequest {
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

/// Block with its interval serialized back to zero-padded HH:MM.
#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub id: Uuid,
    pub plan_id: Uuid,
    #[serde(rename = "type")]
    pub block_type: String,
    pub time_start: String,
    pub time_end: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dishes: Vec<NewBlockItem>,
}

impl BlockResponse {
    pub fn from_block(b: Block) -> Self {
        Self::with_dishes(b, Vec::new())
    }

    pub fn with_dishes(b: Block, dishes: Vec<NewBlockItem>) -> Self {
        Self {
            id: b.id,
            plan_id: b.plan_id,
            block_type: b.block_type,
            time_start: format_time_of_day(b.time_start),
            time_end: format_time_of_day(b.time_end),
            dishes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn response_times_are_zero_padded_hhmm() {
        let block = Block {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            block_type: "breakfast".into(),
            time_start: time!(8:05),
            time_end: time!(9:00),
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };
        let resp = BlockResponse::from_block(block);
        assert_eq!(resp.time_start, "08:05");
        assert_eq!(resp.time_end, "09:00");

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["type"], "breakfast");
        assert!(json.get("dishes").is_none());
    }
}
