use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub created_at: OffsetDateTime,
}

/// Plan row with the owner's name joined in, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct PlanWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub user_name: Option<String>,
}

pub async fn list(db: &PgPool, user_id: Option<Uuid>) -> sqlx::Result<Vec<PlanWithUser>> {
    sqlx::query_as::<_, PlanWithUser>(
        r#"
        SELECT mp.id, mp.user_id, mp.date, mp.created_at, u.name AS user_name
        FROM meal_plans mp
        LEFT JOIN users u ON mp.user_id = u.id
        WHERE ($1::uuid IS NULL OR mp.user_id = $1)
        ORDER BY mp.date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<PlanWithUser>> {
    sqlx::query_as::<_, PlanWithUser>(
        r#"
        SELECT mp.id, mp.user_id, mp.date, mp.created_at, u.name AS user_name
        FROM meal_plans mp
        LEFT JOIN users u ON mp.user_id = u.id
        WHERE mp.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_by_user_date(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
) -> sqlx::Result<Option<Uuid>> {
    let row: Option<(Uuid,)> =
        sqlx::query_as(r#"SELECT id FROM meal_plans WHERE user_id = $1 AND date = $2"#)
            .bind(user_id)
            .bind(date)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn insert(db: &PgPool, user_id: Uuid, date: Date) -> sqlx::Result<Plan> {
    sqlx::query_as::<_, Plan>(
        r#"
        INSERT INTO meal_plans (user_id, date)
        VALUES ($1, $2)
        RETURNING id, user_id, date, created_at
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM meal_plans WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn exists(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let row: Option<(Uuid,)> = sqlx::query_as(r#"SELECT id FROM meal_plans WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}

/// Existence check that also takes a row lock for the rest of the
/// transaction. Concurrent writers to the same plan queue up here, which is
/// what keeps the overlap check race-free and the copy full-replace atomic.
pub async fn lock_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> sqlx::Result<bool> {
    let row: Option<(Uuid,)> =
        sqlx::query_as(r#"SELECT id FROM meal_plans WHERE id = $1 FOR UPDATE"#)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(row.is_some())
}
