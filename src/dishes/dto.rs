use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::Dish;

#[derive(Debug, Deserialize)]
pub struct DishBody {
    pub name: Option<String>,
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
    pub unit: Option<String>,
    pub instruction: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub meal_times: Option<Vec<String>>,
    #[serde(default)]
    pub ingredients: Vec<DishIngredientEntry>,
}

/// Entries with no ingredient id or no positive amount are skipped, not
/// rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct DishIngredientEntry {
    pub ingredient_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DishIngredientOut {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// A dish with its nested composition, the shape all dish endpoints return.
#[derive(Debug, Serialize)]
pub struct DishDetails {
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
    pub meal_times: Vec<String>,
    pub ingredients: Vec<DishIngredientOut>,
}

impl DishDetails {
    pub fn assemble(
        dish: Dish,
        meal_times: Vec<String>,
        ingredients: Vec<DishIngredientOut>,
    ) -> Self {
        Self {
            id: dish.id,
            name: dish.name,
            calories_per_100: dish.calories_per_100,
            proteins_per_100: dish.proteins_per_100,
            fats_per_100: dish.fats_per_100,
            carbs_per_100: dish.carbs_per_100,
            unit: dish.unit,
            instruction: dish.instruction,
            video_url: dish.video_url,
            image_url: dish.image_url,
            meal_times,
            ingredients,
        }
    }
}
