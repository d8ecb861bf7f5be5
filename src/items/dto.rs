use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::{Item, ItemWithDish};

#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    pub block_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub block_id: Option<Uuid>,
    // Nullable on purpose: an item without a dish is a bare entry
    // such as plain water.
    pub dish_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub amount: Option<f64>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub block_id: Uuid,
    pub dish_id: Option<Uuid>,
    pub amount: f64,
    pub note: Option<String>,
}

impl From<Item> for ItemResponse {
    fn from(i: Item) -> Self {
        Self {
            id: i.id,
            block_id: i.block_id,
            dish_id: i.dish_id,
            amount: i.amount,
            note: i.note,
        }
    }
}

/// Listing row: the item plus its dish's display data, when it has a dish.
#[derive(Debug, Serialize)]
pub struct ItemListEntry {
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

impl From<ItemWithDish> for ItemListEntry {
    fn from(i: ItemWithDish) -> Self {
        Self {
            id: i.id,
            block_id: i.block_id,
            dish_id: i.dish_id,
            amount: i.amount,
            note: i.note,
            dish_name: i.dish_name,
            unit: i.unit,
            calories_per_100: i.calories_per_100,
            proteins_per_100: i.proteins_per_100,
            fats_per_100: i.fats_per_100,
            carbs_per_100: i.carbs_per_100,
        }
    }
}
