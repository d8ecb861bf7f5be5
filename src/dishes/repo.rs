use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Dish {
    pub id: Uuid,
    pub name: String,
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
    pub unit: String,
    pub instruction: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Column values for insert/update, so the bind lists stay in one place.
#[derive(Debug, Clone)]
pub struct DishWrite {
    pub name: String,
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
    pub unit: String,
    pub instruction: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MealTimeRow {
    pub dish_id: Uuid,
    pub meal_time: String,
}

/// Composition row; `ingredient_name` comes from a LEFT JOIN and is None
/// only when the referenced ingredient row is gone.
#[derive(Debug, Clone, FromRow)]
pub struct DishIngredientRow {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub ingredient_id: Uuid,
    pub amount: f64,
    pub unit: String,
    pub ingredient_name: Option<String>,
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Dish>> {
    sqlx::query_as::<_, Dish>(
        r#"
        SELECT id, name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100,
               unit, instruction, video_url, image_url, created_at
        FROM dishes
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Dish>> {
    sqlx::query_as::<_, Dish>(
        r#"
        SELECT id, name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100,
               unit, instruction, video_url, image_url, created_at
        FROM dishes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn meal_times_by_dish(db: &PgPool, dish_ids: &[Uuid]) -> sqlx::Result<Vec<MealTimeRow>> {
    sqlx::query_as::<_, MealTimeRow>(
        r#"
        SELECT dish_id, meal_time
        FROM dish_meal_times
        WHERE dish_id = ANY($1)
        ORDER BY dish_id, meal_time
        "#,
    )
    .bind(dish_ids)
    .fetch_all(db)
    .await
}

pub async fn ingredients_by_dish(
    db: &PgPool,
    dish_ids: &[Uuid],
) -> sqlx::Result<Vec<DishIngredientRow>> {
    sqlx::query_as::<_, DishIngredientRow>(
        r#"
        SELECT di.id, di.dish_id, di.ingredient_id, di.amount, di.unit,
               i.name AS ingredient_name
        FROM dish_ingredients di
        LEFT JOIN ingredients i ON di.ingredient_id = i.id
        WHERE di.dish_id = ANY($1)
        ORDER BY di.dish_id, di.id
        "#,
    )
    .bind(dish_ids)
    .fetch_all(db)
    .await
}

pub async fn insert_tx(tx: &mut Transaction<'_, Postgres>, write: &DishWrite) -> sqlx::Result<Dish> {
    sqlx::query_as::<_, Dish>(
        r#"
        INSERT INTO dishes (name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100,
                            unit, instruction, video_url, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100,
                  unit, instruction, video_url, image_url, created_at
        "#,
    )
    .bind(&write.name)
    .bind(write.calories_per_100)
    .bind(write.proteins_per_100)
    .bind(write.fats_per_100)
    .bind(write.carbs_per_100)
    .bind(&write.unit)
    .bind(&write.instruction)
    .bind(&write.video_url)
    .bind(&write.image_url)
    .fetch_one(&mut **tx)
    .await
}

pub async fn update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    write: &DishWrite,
) -> sqlx::Result<Option<Dish>> {
    sqlx::query_as::<_, Dish>(
        r#"
        UPDATE dishes
        SET name = $2, calories_per_100 = $3, proteins_per_100 = $4, fats_per_100 = $5,
            carbs_per_100 = $6, unit = $7, instruction = $8, video_url = $9, image_url = $10
        WHERE id = $1
        RETURNING id, name, calories_per_100, proteins_per_100, fats_per_100, carbs_per_100,
                  unit, instruction, video_url, image_url, created_at
        "#,
    )
    .bind(id)
    .bind(&write.name)
    .bind(write.calories_per_100)
    .bind(write.proteins_per_100)
    .bind(write.fats_per_100)
    .bind(write.carbs_per_100)
    .bind(&write.unit)
    .bind(&write.instruction)
    .bind(&write.video_url)
    .bind(&write.image_url)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn replace_meal_times_tx(
    tx: &mut Transaction<'_, Postgres>,
    dish_id: Uuid,
    meal_times: &[String],
) -> sqlx::Result<()> {
    sqlx::query(r#"DELETE FROM dish_meal_times WHERE dish_id = $1"#)
        .bind(dish_id)
        .execute(&mut **tx)
        .await?;
    for meal_time in meal_times {
        sqlx::query(
            r#"
            INSERT INTO dish_meal_times (dish_id, meal_time)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(dish_id)
        .bind(meal_time)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn replace_ingredients_tx(
    tx: &mut Transaction<'_, Postgres>,
    dish_id: Uuid,
    entries: &[(Uuid, f64, String)],
) -> sqlx::Result<()> {
    sqlx::query(r#"DELETE FROM dish_ingredients WHERE dish_id = $1"#)
        .bind(dish_id)
        .execute(&mut **tx)
        .await?;
    for (ingredient_id, amount, unit) in entries {
        sqlx::query(
            r#"
            INSERT INTO dish_ingredients (dish_id, ingredient_id, amount, unit)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(dish_id)
        .bind(ingredient_id)
        .bind(amount)
        .bind(unit)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM dishes WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
