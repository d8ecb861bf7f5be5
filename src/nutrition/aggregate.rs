use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::ApiError;
use crate::plans;

use super::calc::{self, NutrientTotals, Nutrients, Rates};

/// One item of the plan with its block's meal type and its dish's display
/// data, as read by the aggregation query. `dish_name` is None for bare
/// entries (no dish reference).
#[derive(Debug, Clone, FromRow)]
pub struct PlanItemRow {
    pub block_type: String,
    pub amount: f64,
    pub dish_name: Option<String>,
    pub unit: Option<String>,
    pub calories_per_100: Option<f64>,
    pub proteins_per_100: Option<f64>,
    pub fats_per_100: Option<f64>,
    pub carbs_per_100: Option<f64>,
}

impl PlanItemRow {
    fn rates(&self) -> Rates {
        Rates {
            calories: self.calories_per_100,
            proteins: self.proteins_per_100,
            fats: self.fats_per_100,
            carbs: self.carbs_per_100,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct NutritionReport {
    #[serde(flatten)]
    pub totals: NutrientTotals,
    pub meal_types: String,
}

const SEPARATOR: &str = " | ";
const EMPTY_LISTING: &str = "Нет блюд";

fn meal_type_label(block_type: &str) -> &str {
    match block_type {
        "breakfast" => "Завтрак",
        "lunch" => "Обед",
        "dinner" => "Ужин",
        "snack" => "Перекус",
        other => other,
    }
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        amount.to_string()
    }
}

fn round(v: f64) -> i64 {
    v.round() as i64
}

/// Read-only: every item of the plan joined with its block type and dish
/// data, folded into the report. Never mutates persisted state.
pub async fn plan_nutrition(db: &PgPool, plan_id: Uuid) -> Result<NutritionReport, ApiError> {
    if !plans::repo::exists(db, plan_id).await? {
        return Err(ApiError::NotFound("meal plan"));
    }

    let rows = sqlx::query_as::<_, PlanItemRow>(
        r#"
        SELECT mb.type AS block_type, mi.amount,
               d.name AS dish_name, d.unit,
               d.calories_per_100, d.proteins_per_100, d.fats_per_100, d.carbs_per_100
        FROM meal_blocks mb
        JOIN meal_items mi ON mi.block_id = mb.id
        LEFT JOIN dishes d ON mi.dish_id = d.id
        WHERE mb.plan_id = $1
        ORDER BY mb.time_start, mb.id, mi.created_at, mi.id
        "#,
    )
    .bind(plan_id)
    .fetch_all(db)
    .await?;

    Ok(aggregate_rows(&rows))
}

/// Fold item rows into per-meal-type listings and grand totals.
///
/// Listings show each item's nutrients rounded individually; the grand
/// totals sum the unrounded values and round once at the end. Groups keep
/// the order meal types first appear in (rows arrive ordered by block
/// time).
pub fn aggregate_rows(rows: &[PlanItemRow]) -> NutritionReport {
    let mut totals = Nutrients::default();
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for row in rows {
        // Bare entries (plain water) contribute zero and are not listed.
        let Some(dish_name) = row.dish_name.as_deref() else {
            continue;
        };

        let nutrients = calc::for_amount(row.rates(), row.amount);
        totals += nutrients;

        let entry = format!(
            "{} ({} {}) [{}, {}, {}, {}]",
            dish_name,
            format_amount(row.amount),
            row.unit.as_deref().unwrap_or("г"),
            round(nutrients.calories),
            round(nutrients.proteins),
            round(nutrients.fats),
            round(nutrients.carbs),
        );

        let label = meal_type_label(&row.block_type);
        match groups.iter_mut().find(|(l, _)| l.as_str() == label) {
            Some((_, entries)) => entries.push(entry),
            None => groups.push((label.to_string(), vec![entry])),
        }
    }

    let meal_types = if groups.is_empty() {
        EMPTY_LISTING.to_string()
    } else {
        groups
            .iter()
            .map(|(label, entries)| format!("{}: {}", label, entries.join(SEPARATOR)))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    };

    NutritionReport {
        totals: totals.rounded(),
        meal_types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish_row(block_type: &str, name: &str, amount: f64, calories: f64) -> PlanItemRow {
        PlanItemRow {
            block_type: block_type.into(),
            amount,
            dish_name: Some(name.into()),
            unit: Some("г".into()),
            calories_per_100: Some(calories),
            proteins_per_100: Some(10.0),
            fats_per_100: Some(5.0),
            carbs_per_100: Some(20.0),
        }
    }

    #[test]
    fn single_item_rounds_into_listing_and_totals() {
        // 150g of a 200 cal/100g dish
        let report = aggregate_rows(&[dish_row("breakfast", "Овсянка", 150.0, 200.0)]);
        assert_eq!(report.totals.total_calories, 300);
        assert_eq!(report.totals.total_proteins, 15);
        assert_eq!(report.totals.total_fats, 8);
        assert_eq!(report.totals.total_carbs, 30);
        assert_eq!(report.meal_types, "Завтрак: Овсянка (150 г) [300, 15, 8, 30]");
    }

    #[test]
    fn totals_sum_unrounded_values_before_rounding() {
        // 33g and 34g at 200 cal/100g: 66 + 68 = 134
        let report = aggregate_rows(&[
            dish_row("lunch", "Суп", 33.0, 200.0),
            dish_row("lunch", "Хлеб", 34.0, 200.0),
        ]);
        assert_eq!(report.totals.total_calories, 134);

        // 33g twice at 125 cal/100g: each item displays round(41.25) = 41,
        // but the total is round(82.5) = 83, not 41 + 41.
        let report = aggregate_rows(&[
            dish_row("lunch", "Суп", 33.0, 125.0),
            dish_row("lunch", "Хлеб", 33.0, 125.0),
        ]);
        assert_eq!(report.totals.total_calories, 83);
        assert!(report.meal_types.contains("Суп (33 г) [41,"));
    }

    #[test]
    fn bare_entries_contribute_zero_and_are_not_listed() {
        let water = PlanItemRow {
            block_type: "breakfast".into(),
            amount: 250.0,
            dish_name: None,
            unit: None,
            calories_per_100: None,
            proteins_per_100: None,
            fats_per_100: None,
            carbs_per_100: None,
        };
        let report = aggregate_rows(&[water, dish_row("breakfast", "Каша", 100.0, 90.0)]);
        assert_eq!(report.totals.total_calories, 90);
        assert_eq!(report.meal_types, "Завтрак: Каша (100 г) [90, 10, 5, 20]");
    }

    #[test]
    fn dish_without_rates_is_listed_with_zeros() {
        let row = PlanItemRow {
            block_type: "snack".into(),
            amount: 200.0,
            dish_name: Some("Чай".into()),
            unit: None,
            calories_per_100: None,
            proteins_per_100: None,
            fats_per_100: None,
            carbs_per_100: None,
        };
        let report = aggregate_rows(&[row]);
        assert_eq!(report.totals.total_calories, 0);
        assert_eq!(report.meal_types, "Перекус: Чай (200 г) [0, 0, 0, 0]");
    }

    #[test]
    fn empty_plan_yields_zero_totals_and_empty_listing() {
        let report = aggregate_rows(&[]);
        assert_eq!(report.totals.total_calories, 0);
        assert_eq!(report.totals.total_proteins, 0);
        assert_eq!(report.totals.total_fats, 0);
        assert_eq!(report.totals.total_carbs, 0);
        assert_eq!(report.meal_types, "Нет блюд");
    }

    #[test]
    fn unknown_meal_types_pass_through_untranslated() {
        let report = aggregate_rows(&[dish_row("second_breakfast", "Йогурт", 100.0, 60.0)]);
        assert!(report.meal_types.starts_with("second_breakfast: "));
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let report = aggregate_rows(&[
            dish_row("breakfast", "Овсянка", 100.0, 100.0),
            dish_row("lunch", "Суп", 100.0, 100.0),
            dish_row("breakfast", "Кофе", 50.0, 2.0),
        ]);
        assert_eq!(
            report.meal_types,
            "Завтрак: Овсянка (100 г) [100, 10, 5, 20] | Кофе (50 г) [1, 5, 3, 10] \
             | Обед: Суп (100 г) [100, 10, 5, 20]"
        );
    }

    #[test]
    fn fractional_amounts_are_printed_as_entered() {
        let report = aggregate_rows(&[dish_row("dinner", "Рыба", 150.5, 100.0)]);
        assert!(report.meal_types.contains("Рыба (150.5 г)"));
    }

    #[test]
    fn report_serializes_flat_like_the_wire_format() {
        let report = aggregate_rows(&[dish_row("breakfast", "Овсянка", 150.0, 200.0)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_calories"], 300);
        assert_eq!(json["meal_types"], "Завтрак: Овсянка (150 г) [300, 15, 8, 30]");
    }
}
