use serde::Serialize;

use crate::domain::meal::Meal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealMetrics {
    pub meals_total: usize,
    pub meals_on_diet: usize,
    pub meals_off_diet: usize,
    pub best_on_diet_sequence: usize,
}

/// Aggregates a user's meal history. `meals` must be ordered by date
/// descending; a contiguous run has the same length scanned in either
/// direction, so the best streak matches the chronological one.
pub fn compute_metrics(meals: &[Meal]) -> MealMetrics {
    let mut current = 0;
    let mut best = 0;
    let mut on_diet = 0;

    for meal in meals {
        if meal.on_diet {
            current += 1;
            on_diet += 1;
        } else {
            current = 0;
        }
        if current > best {
            best = current;
        }
    }

    MealMetrics {
        meals_total: meals.len(),
        meals_on_diet: on_diet,
        meals_off_diet: meals.len() - on_diet,
        best_on_diet_sequence: best,
    }
}
