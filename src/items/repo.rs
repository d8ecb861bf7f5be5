use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub block_id: Uuid,
    pub dish_id: Option<Uuid>,
    pub amount: f64,
    pub note: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Item row with its dish's display data joined in. `dish_id` is nullable
/// (a bare note such as plain water), so every dish column is optional.
#[derive(Debug, Clone, FromRow)]
pub struct ItemWithDish {
    pub id: Uuid,
    pub block_id: Uuid,
    pub dish_id: Option<Uuid>,
    pub amount: f64,
    pub note: Option<String>,
    pub dish_name: Option<String>,
    pub unit: Option<String>,
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
}

pub async fn list_by_block(db: &PgPool, block_id: Uuid) -> sqlx::Result<Vec<ItemWithDish>> {
    sqlx::query_as::<_, ItemWithDish>(
        r#"
        SELECT mi.id, mi.block_id, mi.dish_id, mi.amount, mi.note,
               d.name AS dish_name, d.unit,
               d.calories_per_100, d.proteins_per_100, d.fats_per_100, d.carbs_per_100
        FROM meal_items mi
        LEFT JOIN dishes d ON mi.dish_id = d.id
        WHERE mi.block_id = $1
        ORDER BY mi.created_at, mi.id
        "#,
    )
    .bind(block_id)
    .fetch_all(db)
    .await
}

pub async fn list_by_block_tx(
    tx: &mut Transaction<'_, Postgres>,
    block_id: Uuid,
) -> sqlx::Result<Vec<Item>> {
    sqlx::query_as::<_, Item>(
        r#"
        SELECT id, block_id, dish_id, amount, note, created_at
        FROM meal_items
        WHERE block_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(block_id)
    .fetch_all(&mut **tx)
    .await
}

pub async fn insert(
    db: &PgPool,
    block_id: Uuid,
    dish_id: Option<Uuid>,
    amount: f64,
    note: Option<&str>,
) -> sqlx::Result<Item> {
    sqlx::query_as::<_, Item>(
        r#"
        INSERT INTO meal_items (block_id, dish_id, amount, note)
        VALUES ($1, $2, $3, $4)
        RETURNING id, block_id, dish_id, amount, note, created_at
        "#,
    )
    .bind(block_id)
    .bind(dish_id)
    .bind(amount)
    .bind(note)
    .fetch_one(db)
    .await
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    block_id: Uuid,
    dish_id: Option<Uuid>,
    amount: f64,
    note: Option<&str>,
) -> sqlx::Result<Item> {
    sqlx::query_as::<_, Item>(
        r#"
        INSERT INTO meal_items (block_id, dish_id, amount, note)
        VALUES ($1, $2, $3, $4)
        RETURNING id, block_id, dish_id, amount, note, created_at
        "#,
    )
    .bind(block_id)
    .bind(dish_id)
    .bind(amount)
    .bind(note)
    .fetch_one(&mut **tx)
    .await
}

/// Partial update; absent fields keep their stored value.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    amount: Option<f64>,
    note: Option<&str>,
) -> sqlx::Result<Option<Item>> {
    sqlx::query_as::<_, Item>(
        r#"
        UPDATE meal_items
        SET amount = COALESCE($2, amount), note = COALESCE($3, note)
        WHERE id = $1
        RETURNING id, block_id, dish_id, amount, note, created_at
        "#,
    )
    .bind(id)
    .bind(amount)
    .bind(note)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM meal_items WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn block_exists(db: &PgPool, block_id: Uuid) -> sqlx::Result<bool> {
    let row: Option<(Uuid,)> = sqlx::query_as(r#"SELECT id FROM meal_blocks WHERE id = $1"#)
        .bind(block_id)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}
