use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

use super::dto::{DishDetails, DishIngredientOut, DishIngredientEntry};
use super::repo::{self, Dish, DishIngredientRow, DishWrite, MealTimeRow};

/// Group flat join rows under their dishes, producing native nested
/// structures. A composition row whose ingredient no longer resolves is
/// surfaced as a parse failure instead of being dropped.
pub fn group_dish_details(
    dishes: Vec<Dish>,
    meal_times: Vec<MealTimeRow>,
    ingredients: Vec<DishIngredientRow>,
) -> Result<Vec<DishDetails>, ApiError> {
    let mut times_by_dish: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in meal_times {
        times_by_dish
            .entry(row.dish_id)
            .or_default()
            .push(row.meal_time);
    }

    let mut ingredients_by_dish: HashMap<Uuid, Vec<DishIngredientOut>> = HashMap::new();
    for row in ingredients {
        let name = row.ingredient_name.ok_or_else(|| {
            ApiError::Parse(format!(
                "dish ingredient {} references a missing ingredient {}",
                row.id, row.ingredient_id
            ))
        })?;
        ingredients_by_dish
            .entry(row.dish_id)
            .or_default()
            .push(DishIngredientOut {
                id: row.id,
                ingredient_id: row.ingredient_id,
                name,
                amount: row.amount,
                unit: row.unit,
            });
    }

    Ok(dishes
        .into_iter()
        .map(|dish| {
            let times = times_by_dish.remove(&dish.id).unwrap_or_default();
            let ings = ingredients_by_dish.remove(&dish.id).unwrap_or_default();
            DishDetails::assemble(dish, times, ings)
        })
        .collect())
}

pub async fn list_details(db: &PgPool) -> Result<Vec<DishDetails>, ApiError> {
    let dishes = repo::list(db).await?;
    let ids: Vec<Uuid> = dishes.iter().map(|d| d.id).collect();
    let meal_times = repo::meal_times_by_dish(db, &ids).await?;
    let ingredients = repo::ingredients_by_dish(db, &ids).await?;
    group_dish_details(dishes, meal_times, ingredients)
}

pub async fn get_details(db: &PgPool, id: Uuid) -> Result<Option<DishDetails>, ApiError> {
    let Some(dish) = repo::get(db, id).await? else {
        return Ok(None);
    };
    let meal_times = repo::meal_times_by_dish(db, &[id]).await?;
    let ingredients = repo::ingredients_by_dish(db, &[id]).await?;
    let mut details = group_dish_details(vec![dish], meal_times, ingredients)?;
    Ok(details.pop())
}

/// Keep only usable composition entries, mirroring how loose input has
/// always been treated: no ingredient id or no positive amount means skip.
pub fn usable_ingredient_entries(entries: &[DishIngredientEntry]) -> Vec<(Uuid, f64, String)> {
    entries
        .iter()
        .filter_map(|entry| {
            let ingredient_id = entry.ingredient_id?;
            let amount = entry.amount.filter(|a| *a > 0.0)?;
            let unit = entry.unit.clone().unwrap_or_else(|| "г".to_string());
            Some((ingredient_id, amount, unit))
        })
        .collect()
}

pub async fn create_dish(
    db: &PgPool,
    write: DishWrite,
    meal_times: Vec<String>,
    ingredients: Vec<DishIngredientEntry>,
) -> Result<DishDetails, ApiError> {
    let entries = usable_ingredient_entries(&ingredients);

    let mut tx = db.begin().await?;
    let dish = repo::insert_tx(&mut tx, &write).await?;
    repo::replace_meal_times_tx(&mut tx, dish.id, &meal_times).await?;
    if let Err(e) = repo::replace_ingredients_tx(&mut tx, dish.id, &entries).await {
        return Err(map_ingredient_error(e));
    }
    tx.commit().await?;

    info!(dish_id = %dish.id, "dish created");
    get_details(db, dish.id)
        .await?
        .ok_or(ApiError::NotFound("dish"))
}

pub async fn update_dish(
    db: &PgPool,
    id: Uuid,
    write: DishWrite,
    meal_times: Vec<String>,
    ingredients: Vec<DishIngredientEntry>,
) -> Result<DishDetails, ApiError> {
    let entries = usable_ingredient_entries(&ingredients);

    let mut tx = db.begin().await?;
    let Some(dish) = repo::update_tx(&mut tx, id, &write).await? else {
        return Err(ApiError::NotFound("dish"));
    };
    repo::replace_meal_times_tx(&mut tx, dish.id, &meal_times).await?;
    if let Err(e) = repo::replace_ingredients_tx(&mut tx, dish.id, &entries).await {
        return Err(map_ingredient_error(e));
    }
    tx.commit().await?;

    info!(dish_id = %dish.id, "dish updated");
    get_details(db, dish.id)
        .await?
        .ok_or(ApiError::NotFound("dish"))
}

fn map_ingredient_error(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            ApiError::validation("unknown ingredient_id")
        }
        _ => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn dish(name: &str) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            name: name.into(),
            calories_per_100: Some(100.0),
            proteins_per_100: None,
            fats_per_100: None,
            carbs_per_100: None,
            unit: "г".into(),
            instruction: None,
            video_url: None,
            image_url: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn groups_nested_rows_under_their_dish() {
        let d1 = dish("Овсянка");
        let d2 = dish("Суп");
        let times = vec![
            MealTimeRow {
                dish_id: d1.id,
                meal_time: "breakfast".into(),
            },
            MealTimeRow {
                dish_id: d2.id,
                meal_time: "lunch".into(),
            },
            MealTimeRow {
                dish_id: d2.id,
                meal_time: "dinner".into(),
            },
        ];
        let ingredient_id = Uuid::new_v4();
        let ingredients = vec![DishIngredientRow {
            id: Uuid::new_v4(),
            dish_id: d1.id,
            ingredient_id,
            amount: 50.0,
            unit: "г".into(),
            ingredient_name: Some("Овсяные хлопья".into()),
        }];

        let details = group_dish_details(vec![d1, d2], times, ingredients).unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].meal_times, vec!["breakfast"]);
        assert_eq!(details[0].ingredients.len(), 1);
        assert_eq!(details[0].ingredients[0].name, "Овсяные хлопья");
        assert_eq!(details[1].meal_times, vec!["lunch", "dinner"]);
        assert!(details[1].ingredients.is_empty());
    }

    #[test]
    fn missing_ingredient_reference_is_a_parse_error_not_an_empty_list() {
        let d = dish("Суп");
        let ingredients = vec![DishIngredientRow {
            id: Uuid::new_v4(),
            dish_id: d.id,
            ingredient_id: Uuid::new_v4(),
            amount: 10.0,
            unit: "г".into(),
            ingredient_name: None,
        }];
        let err = group_dish_details(vec![d], Vec::new(), ingredients).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn unusable_ingredient_entries_are_skipped() {
        let good = Uuid::new_v4();
        let entries = vec![
            DishIngredientEntry {
                ingredient_id: Some(good),
                amount: Some(40.0),
                unit: None,
            },
            DishIngredientEntry {
                ingredient_id: None,
                amount: Some(10.0),
                unit: None,
            },
            DishIngredientEntry {
                ingredient_id: Some(Uuid::new_v4()),
                amount: None,
                unit: None,
            },
            DishIngredientEntry {
                ingredient_id: Some(Uuid::new_v4()),
                amount: Some(0.0),
                unit: None,
            },
        ];
        let entries = usable_ingredient_entries(&entries);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], (good, 40.0, "г".to_string()));
    }
}
