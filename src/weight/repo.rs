use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct WeightEntry {
    pub weight: f64,
    pub recorded_at: Date,
}

/// Most recent weight strictly before the given date.
pub async fn last_before(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
) -> sqlx::Result<Option<WeightEntry>> {
    sqlx::query_as::<_, WeightEntry>(
        r#"
        SELECT weight, recorded_at
        FROM weight_history
        WHERE user_id = $1 AND recorded_at < $2
        ORDER BY recorded_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(db)
    .await
}

pub async fn history(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<WeightEntry>> {
    sqlx::query_as::<_, WeightEntry>(
        r#"
        SELECT weight, recorded_at
        FROM weight_history
        WHERE user_id = $1
        ORDER BY recorded_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
