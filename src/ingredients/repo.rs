use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngredientRates {
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Ingredient>> {
    sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100, created_at
        FROM ingredients
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn insert(db: &PgPool, name: &str, rates: IngredientRates) -> sqlx::Result<Ingredient> {
    sqlx::query_as::<_, Ingredient>(
        r#"
        INSERT INTO ingredients (name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100, created_at
        "#,
    )
    .bind(name)
    .bind(rates.calories_per_100)
    .bind(rates.proteins_per_100)
    .bind(rates.fats_per_100)
    .bind(rates.carbs_per_100)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    name: &str,
    rates: IngredientRates,
) -> sqlx::Result<Option<Ingredient>> {
    sqlx::query_as::<_, Ingredient>(
        r#"
        UPDATE ingredients
        SET name = $2, calories_per_100 = $3, proteins_per_100 = $4,
            fats_per_100 = $5, carbs_per_100 = $6
        WHERE id = $1
        RETURNING id, name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(rates.calories_per_100)
    .bind(rates.proteins_per_100)
    .bind(rates.fats_per_100)
    .bind(rates.carbs_per_100)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM ingredients WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
