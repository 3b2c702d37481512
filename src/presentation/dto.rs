use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::meal::Meal;
use crate::domain::metrics::MealMetrics;

/// Shared body for create and update; update is full-replace, so the
/// schemas are identical.
#[derive(Debug, Clone, Deserialize)]
pub struct MealBody {
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "onDiet")]
    pub on_diet: bool,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub meal: Meal,
}

#[derive(Debug, Serialize)]
pub struct MealsResponse {
    pub meals: Vec<Meal>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub metrics: MealMetrics,
}
