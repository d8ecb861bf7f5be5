use serde::Serialize;

/// Per-100-unit nutrient rates as stored on a dish. Missing rate data
/// contributes zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rates {
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub carbs: Option<f64>,
}

/// Unrounded absolute nutrient amounts for one or more items.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Nutrients {
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}

/// Absolute amount contributed by `amount` units at a per-100 rate.
pub fn scaled(rate_per_100: f64, amount: f64) -> f64 {
    rate_per_100 * amount / 100.0
}

pub fn for_amount(rates: Rates, amount: f64) -> Nutrients {
    Nutrients {
        calories: scaled(rates.calories.unwrap_or(0.0), amount),
        proteins: scaled(rates.proteins.unwrap_or(0.0), amount),
        fats: scaled(rates.fats.unwrap_or(0.0), amount),
        carbs: scaled(rates.carbs.unwrap_or(0.0), amount),
    }
}

impl std::ops::AddAssign for Nutrients {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.proteins += rhs.proteins;
        self.fats += rhs.fats;
        self.carbs += rhs.carbs;
    }
}

/// Grand totals over a set of items: unrounded per-item amounts are summed
/// first and rounded once here. Item-level displays round each item
/// individually instead; the two must never be conflated.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NutrientTotals {
    pub total_calories: i64,
    pub total_proteins: i64,
    pub total_fats: i64,
    pub total_carbs: i64,
}

impl Nutrients {
    pub fn rounded(self) -> NutrientTotals {
        NutrientTotals {
            total_calories: self.calories.round() as i64,
            total_proteins: self.proteins.round() as i64,
            total_fats: self.fats.round() as i64,
            total_carbs: self.carbs.round() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_per_100_rates() {
        // 150g of a 200 cal/100g dish
        assert_eq!(scaled(200.0, 150.0), 300.0);
        assert_eq!(scaled(0.0, 150.0), 0.0);
    }

    #[test]
    fn missing_rates_contribute_zero() {
        let n = for_amount(
            Rates {
                calories: Some(200.0),
                ..Rates::default()
            },
            150.0,
        );
        assert_eq!(n.calories, 300.0);
        assert_eq!(n.proteins, 0.0);
        assert_eq!(n.fats, 0.0);
        assert_eq!(n.carbs, 0.0);
    }

    #[test]
    fn totals_round_once_at_the_end() {
        // Two items of 41.25 each: the sum 82.5 rounds to 83. Rounding each
        // item first would give 41 + 41 = 82.
        let mut totals = Nutrients::default();
        totals += for_amount(
            Rates {
                calories: Some(125.0),
                ..Rates::default()
            },
            33.0,
        );
        totals += for_amount(
            Rates {
                calories: Some(125.0),
                ..Rates::default()
            },
            33.0,
        );
        assert_eq!(totals.calories, 82.5);
        assert_eq!(totals.rounded().total_calories, 83);
    }
}
