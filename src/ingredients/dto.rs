use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::{Ingredient, IngredientRates};

#[derive(Debug, Deserialize)]
pub struct IngredientBody {
    pub name: Option<String>,
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
}

impl IngredientBody {
    pub fn rates(&self) -> IngredientRates {
        IngredientRates {
            calories_per_100: self.calories_per_100,
            proteins_per_100: self.proteins_per_100,
            fats_per_100: self.fats_per_100,
            carbs_per_100: self.carbs_per_100,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
}

impl From<Ingredient> for IngredientResponse {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            calories_per_100: i.calories_per_100,
            proteins_per_100: i.proteins_per_100,
            fats_per_100: i.fats_per_100,
            carbs_per_100: i.carbs_per_100,
        }
    }
}
