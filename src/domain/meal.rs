use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One logged meal. `date` is stored as epoch milliseconds.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub date: i64,
    pub on_diet: bool,
}

impl Meal {
    pub fn new(
        user_id: Uuid,
        name: String,
        description: String,
        date: DateTime<Utc>,
        on_diet: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            description,
            date: date.timestamp_millis(),
            on_diet,
        }
    }
}
