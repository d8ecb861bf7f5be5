use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use time::Time;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{items, plans};

use super::dto::NewBlockItem;
use super::repo::{self, Block};

lazy_static! {
    static ref TIME_RE: Regex = Regex::new(r"^(\d{1,2}):(\d{1,2})(?::\d{1,2})?$").unwrap();
}

/// Normalize a time-of-day string to a `Time`. Accepts "H:M", "HH:MM" and
/// "HH:MM:SS" (seconds are discarded; blocks are minute-granular).
pub fn parse_time_of_day(field: &'static str, raw: &str) -> Result<Time, ApiError> {
    let caps = TIME_RE
        .captures(raw.trim())
        .ok_or_else(|| invalid_time(field, raw))?;
    let hour: u8 = caps[1].parse().map_err(|_| invalid_time(field, raw))?;
    let minute: u8 = caps[2].parse().map_err(|_| invalid_time(field, raw))?;
    Time::from_hms(hour, minute, 0).map_err(|_| invalid_time(field, raw))
}

fn invalid_time(field: &str, raw: &str) -> ApiError {
    ApiError::validation_with(
        "invalid time format",
        json!({ field: format!("expected HH:MM, got '{raw}'") }),
    )
}

/// Zero-padded HH:MM, the format block times are reported in.
pub fn format_time_of_day(t: Time) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

/// Half-open interval intersection: [s1, e1) and [s2, e2) share an instant
/// iff s1 < e2 && s2 < e1. Touching boundaries are not an overlap, so a
/// breakfast ending 09:00 and a lunch starting 09:00 coexist.
pub fn intervals_overlap(s1: Time, e1: Time, s2: Time, e2: Time) -> bool {
    s1 < e2 && s2 < e1
}

/// A validated candidate interval with its meal-type tag.
#[derive(Debug, Clone)]
pub struct BlockWrite {
    pub block_type: String,
    pub time_start: Time,
    pub time_end: Time,
}

impl BlockWrite {
    pub fn new(block_type: String, time_start: &str, time_end: &str) -> Result<Self, ApiError> {
        let time_start = parse_time_of_day("time_start", time_start)?;
        let time_end = parse_time_of_day("time_end", time_end)?;
        if time_start >= time_end {
            return Err(ApiError::validation(
                "time_start must be before time_end",
            ));
        }
        Ok(Self {
            block_type,
            time_start,
            time_end,
        })
    }
}

async fn check_overlap(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    write: &BlockWrite,
    exclude_id: Option<Uuid>,
) -> Result<(), ApiError> {
    let existing = repo::list_by_plan_tx(tx, plan_id, exclude_id).await?;
    if let Some(conflict) = existing.iter().find(|b| {
        intervals_overlap(write.time_start, write.time_end, b.time_start, b.time_end)
    }) {
        warn!(%plan_id, conflicting_block = %conflict.id, "interval overlaps an existing block");
        return Err(overlap_conflict(write, conflict));
    }
    Ok(())
}

fn overlap_conflict(candidate: &BlockWrite, existing: &Block) -> ApiError {
    ApiError::conflict_with(
        "time interval overlaps an existing block",
        json!({
            "existing_block": {
                "type": existing.block_type,
                "time_start": format_time_of_day(existing.time_start),
                "time_end": format_time_of_day(existing.time_end),
            },
            "new_block": {
                "type": candidate.block_type,
                "time_start": format_time_of_day(candidate.time_start),
                "time_end": format_time_of_day(candidate.time_end),
            },
        }),
    )
}

/// Validate and persist a new block with any inline items, all in one
/// transaction. The plan-row lock serializes concurrent writers on the same
/// plan, so two requests cannot both pass the overlap check and commit
/// overlapping intervals.
pub async fn create_block(
    db: &PgPool,
    plan_id: Uuid,
    write: BlockWrite,
    new_items: Vec<NewBlockItem>,
) -> Result<Block, ApiError> {
    for item in &new_items {
        if item.amount <= 0.0 {
            return Err(ApiError::validation("item amount must be positive"));
        }
    }

    let mut tx = db.begin().await?;

    if !plans::repo::lock_tx(&mut tx, plan_id).await? {
        return Err(ApiError::NotFound("meal plan"));
    }
    check_overlap(&mut tx, plan_id, &write, None).await?;

    let block = repo::insert_tx(
        &mut tx,
        plan_id,
        &write.block_type,
        write.time_start,
        write.time_end,
    )
    .await?;
    for item in &new_items {
        items::repo::insert_tx(&mut tx, block.id, item.dish_id, item.amount, item.note.as_deref())
            .await?;
    }

    tx.commit().await?;
    info!(block_id = %block.id, %plan_id, "meal block created");
    Ok(block)
}

/// Re-validate and persist new bounds for an existing block. The block
/// excludes itself from the overlap check, so saving an unchanged interval
/// never self-conflicts.
pub async fn update_block(
    db: &PgPool,
    block_id: Uuid,
    write: BlockWrite,
) -> Result<Block, ApiError> {
    let mut tx = db.begin().await?;

    let Some(plan_id) = repo::plan_id_of_tx(&mut tx, block_id).await? else {
        return Err(ApiError::NotFound("meal block"));
    };
    if !plans::repo::lock_tx(&mut tx, plan_id).await? {
        return Err(ApiError::NotFound("meal plan"));
    }
    check_overlap(&mut tx, plan_id, &write, Some(block_id)).await?;

    let block = repo::update_tx(
        &mut tx,
        block_id,
        &write.block_type,
        write.time_start,
        write.time_end,
    )
    .await?;

    tx.commit().await?;
    info!(%block_id, %plan_id, "meal block updated");
    Ok(block)
}

#[cfg(test)]
mod time_tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn parses_and_zero_pads_short_forms() {
        assert_eq!(parse_time_of_day("time_start", "8:5").unwrap(), time!(8:05));
        assert_eq!(
            parse_time_of_day("time_start", "09:00").unwrap(),
            time!(9:00)
        );
    }

    #[test]
    fn discards_seconds() {
        assert_eq!(
            parse_time_of_day("time_end", "09:30:45").unwrap(),
            time!(9:30)
        );
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(parse_time_of_day("time_start", "0900").is_err());
    }

    #[test]
    fn rejects_non_numeric() {
        assert!(parse_time_of_day("time_start", "aa:bb").is_err());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(parse_time_of_day("time_start", "25:00").is_err());
        assert!(parse_time_of_day("time_start", "12:60").is_err());
    }

    #[test]
    fn malformed_time_is_a_validation_error_not_a_conflict() {
        let err = parse_time_of_day("time_start", "breakfast").unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(format_time_of_day(time!(8:05)), "08:05");
        assert_eq!(format_time_of_day(time!(23:59)), "23:59");
    }
}

#[cfg(test)]
mod overlap_tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn touching_boundaries_do_not_overlap() {
        // breakfast 08:00-09:00, lunch 09:00-10:00
        assert!(!intervals_overlap(
            time!(9:00),
            time!(10:00),
            time!(8:00),
            time!(9:00)
        ));
        assert!(!intervals_overlap(
            time!(8:00),
            time!(9:00),
            time!(9:00),
            time!(10:00)
        ));
    }

    #[test]
    fn partial_overlap_detected() {
        assert!(intervals_overlap(
            time!(8:30),
            time!(9:30),
            time!(8:00),
            time!(9:00)
        ));
    }

    #[test]
    fn containment_detected_both_ways() {
        assert!(intervals_overlap(
            time!(8:00),
            time!(12:00),
            time!(9:00),
            time!(10:00)
        ));
        assert!(intervals_overlap(
            time!(9:00),
            time!(10:00),
            time!(8:00),
            time!(12:00)
        ));
    }

    #[test]
    fn identical_intervals_overlap() {
        assert!(intervals_overlap(
            time!(8:00),
            time!(9:00),
            time!(8:00),
            time!(9:00)
        ));
    }

    #[test]
    fn disjoint_intervals_do_not_overlap() {
        assert!(!intervals_overlap(
            time!(8:00),
            time!(9:00),
            time!(12:00),
            time!(13:00)
        ));
    }

    #[test]
    fn block_write_rejects_inverted_interval() {
        let err = BlockWrite::new("lunch".into(), "13:00", "12:00").unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        let err = BlockWrite::new("lunch".into(), "12:00", "12:00").unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[test]
    fn conflict_carries_both_blocks() {
        let candidate = BlockWrite::new("lunch".into(), "8:30", "9:30").unwrap();
        let existing = Block {
            id: uuid::Uuid::new_v4(),
            plan_id: uuid::Uuid::new_v4(),
            block_type: "breakfast".into(),
            time_start: time!(8:00),
            time_end: time!(9:00),
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };
        let ApiError::Conflict { details, .. } = overlap_conflict(&candidate, &existing) else {
            panic!("expected conflict");
        };
        let details = details.unwrap();
        assert_eq!(details["existing_block"]["type"], "breakfast");
        assert_eq!(details["existing_block"]["time_start"], "08:00");
        assert_eq!(details["new_block"]["time_start"], "08:30");
        assert_eq!(details["new_block"]["time_end"], "09:30");
    }
}
