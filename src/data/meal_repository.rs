use crate::domain::error::DomainError;
use crate::domain::meal::Meal;
use crate::presentation::dto::MealBody;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn insert(&self, meal: Meal) -> Result<Meal, DomainError>;
    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Meal>, DomainError>;
    /// Full-replace update conditioned on ownership. Returns whether a
    /// row was touched; `false` covers both an unknown id and an id
    /// owned by another user.
    async fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: MealBody,
    ) -> Result<bool, DomainError>;
    /// Delete conditioned on ownership. Returns whether a row was removed.
    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Meal>, DomainError>;
    async fn list_for_user_by_date_desc(&self, user_id: Uuid) -> Result<Vec<Meal>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresMealRepository {
    pool: PgPool,
}

impl PostgresMealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MealRepository for PostgresMealRepository {
    async fn insert(&self, meal: Meal) -> Result<Meal, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO meals (id, user_id, name, description, date, on_diet)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(meal.id)
        .bind(meal.user_id)
        .bind(&meal.name)
        .bind(&meal.description)
        .bind(meal.date)
        .bind(meal.on_diet)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to insert meal: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(meal_id = %meal.id, user_id = %meal.user_id, "meal created");
        Ok(meal)
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Meal>, DomainError> {
        sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, name, description, date, on_diet
            FROM meals
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_for_user {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: MealBody,
    ) -> Result<bool, DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE meals
            SET name = $1, description = $2, date = $3, on_diet = $4
            WHERE id = $5 AND user_id = $6
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.date.timestamp_millis())
        .bind(update.on_diet)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update meal {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        info!(meal_id = %id, "meal updated");
        Ok(true)
    }

    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete meal {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        info!(meal_id = %id, "meal deleted");
        Ok(true)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Meal>, DomainError> {
        sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, name, description, date, on_diet
            FROM meals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while listing meals: {}", e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn list_for_user_by_date_desc(&self, user_id: Uuid) -> Result<Vec<Meal>, DomainError> {
        sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, name, description, date, on_diet
            FROM meals
            WHERE user_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while listing meals by date: {}", e);
            DomainError::Internal(e.to_string())
        })
    }
}
