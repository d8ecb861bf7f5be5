use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{OffsetDateTime, Time};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Block {
    pub id: Uuid,
    pub plan_id: Uuid,
    #[sqlx(rename = "type")]
    pub block_type: String,
    pub time_start: Time,
    pub time_end: Time,
    pub created_at: OffsetDateTime,
}

pub async fn list_by_plan(db: &PgPool, plan_id: Uuid) -> sqlx::Result<Vec<Block>> {
    sqlx::query_as::<_, Block>(
        r#"
        SELECT id, plan_id, type, time_start, time_end, created_at
        FROM meal_blocks
        WHERE plan_id = $1
        ORDER BY time_start
        "#,
    )
    .bind(plan_id)
    .fetch_all(db)
    .await
}

/// Blocks of a plan in insertion order, optionally excluding one block
/// (a block being updated must not conflict with itself).
pub async fn list_by_plan_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    exclude_id: Option<Uuid>,
) -> sqlx::Result<Vec<Block>> {
    sqlx::query_as::<_, Block>(
        r#"
        SELECT id, plan_id, type, time_start, time_end, created_at
        FROM meal_blocks
        WHERE plan_id = $1
          AND ($2::uuid IS NULL OR id <> $2)
        ORDER BY created_at, id
        "#,
    )
    .bind(plan_id)
    .bind(exclude_id)
    .fetch_all(&mut **tx)
    .await
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    block_type: &str,
    time_start: Time,
    time_end: Time,
) -> sqlx::Result<Block> {
    sqlx::query_as::<_, Block>(
        r#"
        INSERT INTO meal_blocks (plan_id, type, time_start, time_end)
        VALUES ($1, $2, $3, $4)
        RETURNING id, plan_id, type, time_start, time_end, created_at
        "#,
    )
    .bind(plan_id)
    .bind(block_type)
    .bind(time_start)
    .bind(time_end)
    .fetch_one(&mut **tx)
    .await
}

pub async fn update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    block_type: &str,
    time_start: Time,
    time_end: Time,
) -> sqlx::Result<Block> {
    sqlx::query_as::<_, Block>(
        r#"
        UPDATE meal_blocks
        SET type = $2, time_start = $3, time_end = $4
        WHERE id = $1
        RETURNING id, plan_id, type, time_start, time_end, created_at
        "#,
    )
    .bind(id)
    .bind(block_type)
    .bind(time_start)
    .bind(time_end)
    .fetch_one(&mut **tx)
    .await
}

pub async fn plan_id_of_tx(
    tx: &mut Transaction<'_, Postgres>,
    block_id: Uuid,
) -> sqlx::Result<Option<Uuid>> {
    let row: Option<(Uuid,)> =
        sqlx::query_as(r#"SELECT plan_id FROM meal_blocks WHERE id = $1"#)
            .bind(block_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(row.map(|(plan_id,)| plan_id))
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM meal_blocks WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Items go with their blocks via ON DELETE CASCADE.
pub async fn delete_by_plan_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
) -> sqlx::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM meal_blocks WHERE plan_id = $1"#)
        .bind(plan_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
