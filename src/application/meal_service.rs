use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::meal_repository::MealRepository;
use crate::domain::metrics::{MealMetrics, compute_metrics};
use crate::domain::{error::DomainError, meal::Meal};
use crate::presentation::dto::MealBody;

#[derive(Clone)]
pub struct MealService<R: MealRepository + 'static> {
    repo: Arc<R>,
}

impl<R> MealService<R>
where
    R: MealRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, payload))]
    pub async fn create_meal(&self, user_id: Uuid, payload: MealBody) -> Result<Meal, DomainError> {
        validate_body(&payload)?;
        let meal = Meal::new(
            user_id,
            payload.name,
            payload.description,
            payload.date,
            payload.on_diet,
        );
        self.repo.insert(meal).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update_meal(
        &self,
        user_id: Uuid,
        meal_id: Uuid,
        payload: MealBody,
    ) -> Result<(), DomainError> {
        validate_body(&payload)?;
        if self.repo.update_for_user(meal_id, user_id, payload).await? {
            Ok(())
        } else {
            Err(DomainError::MealNotFound)
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_meal(&self, user_id: Uuid, meal_id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete_for_user(meal_id, user_id).await? {
            Ok(())
        } else {
            Err(DomainError::MealNotFound)
        }
    }

    pub async fn get_meal(&self, user_id: Uuid, meal_id: Uuid) -> Result<Meal, DomainError> {
        self.repo
            .find_for_user(meal_id, user_id)
            .await?
            .ok_or(DomainError::MealNotFound)
    }

    pub async fn list_meals(&self, user_id: Uuid) -> Result<Vec<Meal>, DomainError> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn metrics(&self, user_id: Uuid) -> Result<MealMetrics, DomainError> {
        let meals = self.repo.list_for_user_by_date_desc(user_id).await?;
        Ok(compute_metrics(&meals))
    }
}

fn validate_body(payload: &MealBody) -> Result<(), DomainError> {
    if payload.name.trim().is_empty() {
        return Err(DomainError::Validation("name must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryMealRepository {
        meals: Mutex<Vec<Meal>>,
    }

    #[async_trait]
    impl MealRepository for InMemoryMealRepository {
        async fn insert(&self, meal: Meal) -> Result<Meal, DomainError> {
            self.meals.lock().unwrap().push(meal.clone());
            Ok(meal)
        }

        async fn find_for_user(
            &self,
            id: Uuid,
            user_id: Uuid,
        ) -> Result<Option<Meal>, DomainError> {
            Ok(self
                .meals
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.id == id && m.user_id == user_id)
                .cloned())
        }

        async fn update_for_user(
            &self,
            id: Uuid,
            user_id: Uuid,
            update: MealBody,
        ) -> Result<bool, DomainError> {
            let mut meals = self.meals.lock().unwrap();
            let Some(meal) = meals.iter_mut().find(|m| m.id == id && m.user_id == user_id)
            else {
                return Ok(false);
            };
            meal.name = update.name;
            meal.description = update.description;
            meal.date = update.date.timestamp_millis();
            meal.on_diet = update.on_diet;
            Ok(true)
        }

        async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
            let mut meals = self.meals.lock().unwrap();
            let before = meals.len();
            meals.retain(|m| !(m.id == id && m.user_id == user_id));
            Ok(meals.len() < before)
        }

        async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Meal>, DomainError> {
            Ok(self
                .meals
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn list_for_user_by_date_desc(
            &self,
            user_id: Uuid,
        ) -> Result<Vec<Meal>, DomainError> {
            let mut meals = self.list_for_user(user_id).await?;
            meals.sort_by(|a, b| b.date.cmp(&a.date));
            Ok(meals)
        }
    }

    fn service() -> (MealService<InMemoryMealRepository>, Arc<InMemoryMealRepository>) {
        let repo = Arc::new(InMemoryMealRepository::default());
        (MealService::new(Arc::clone(&repo)), repo)
    }

    fn body(name: &str, on_diet: bool, day: u32) -> MealBody {
        MealBody {
            name: name.into(),
            description: format!("{name} description"),
            date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            on_diet,
        }
    }

    #[tokio::test]
    async fn create_rejects_empty_name_before_persisting() {
        let (service, repo) = service();
        let result = service
            .create_meal(Uuid::new_v4(), body("   ", true, 1))
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.meals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_meal_round_trips_through_get() {
        let (service, _repo) = service();
        let user_id = Uuid::new_v4();
        let payload = body("Breakfast", true, 1);
        let expected_millis = payload.date.timestamp_millis();

        let created = service.create_meal(user_id, payload).await.unwrap();
        let fetched = service.get_meal(user_id, created.id).await.unwrap();

        assert_eq!(fetched.name, "Breakfast");
        assert_eq!(fetched.description, "Breakfast description");
        assert!(fetched.on_diet);
        assert_eq!(fetched.date, expected_millis);
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let (service, _repo) = service();
        let user_id = Uuid::new_v4();
        let created = service
            .create_meal(user_id, body("Lunch", false, 2))
            .await
            .unwrap();

        service
            .update_meal(user_id, created.id, body("Salad", true, 3))
            .await
            .unwrap();

        let updated = service.get_meal(user_id, created.id).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Salad");
        assert!(updated.on_diet);
        assert_ne!(updated.date, created.date);
    }

    #[tokio::test]
    async fn update_does_not_cross_user_boundaries() {
        let (service, repo) = service();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let created = service
            .create_meal(owner, body("Dinner", true, 4))
            .await
            .unwrap();

        let result = service
            .update_meal(intruder, created.id, body("Stolen", false, 5))
            .await;

        assert!(matches!(result, Err(DomainError::MealNotFound)));
        let stored = repo.meals.lock().unwrap()[0].clone();
        assert_eq!(stored.name, "Dinner");
        assert!(stored.on_diet);
    }

    #[tokio::test]
    async fn delete_does_not_cross_user_boundaries() {
        let (service, repo) = service();
        let owner = Uuid::new_v4();
        let created = service
            .create_meal(owner, body("Snack", true, 6))
            .await
            .unwrap();

        let result = service.delete_meal(Uuid::new_v4(), created.id).await;

        assert!(matches!(result, Err(DomainError::MealNotFound)));
        assert_eq!(repo.meals.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_owned_meal() {
        let (service, repo) = service();
        let user_id = Uuid::new_v4();
        let created = service
            .create_meal(user_id, body("Snack", false, 7))
            .await
            .unwrap();

        service.delete_meal(user_id, created.id).await.unwrap();

        assert!(repo.meals.lock().unwrap().is_empty());
        let result = service.get_meal(user_id, created.id).await;
        assert!(matches!(result, Err(DomainError::MealNotFound)));
    }

    #[tokio::test]
    async fn list_only_returns_own_meals() {
        let (service, _repo) = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        service.create_meal(alice, body("A1", true, 1)).await.unwrap();
        service.create_meal(bob, body("B1", true, 2)).await.unwrap();
        service.create_meal(alice, body("A2", false, 3)).await.unwrap();

        let meals = service.list_meals(alice).await.unwrap();
        assert_eq!(meals.len(), 2);
        assert!(meals.iter().all(|m| m.user_id == alice));
    }

    #[tokio::test]
    async fn metrics_track_best_streak_over_date_order() {
        let (service, _repo) = service();
        let user_id = Uuid::new_v4();
        // days ascending; newest-first scan sees t,t,t,f,t,t
        for (day, on_diet) in [(1, true), (2, true), (3, false), (4, true), (5, true), (6, true)]
        {
            service
                .create_meal(user_id, body(&format!("day {day}"), on_diet, day))
                .await
                .unwrap();
        }

        let metrics = service.metrics(user_id).await.unwrap();
        assert_eq!(metrics.meals_total, 6);
        assert_eq!(metrics.meals_on_diet, 5);
        assert_eq!(metrics.meals_off_diet, 1);
        assert_eq!(metrics.best_on_diet_sequence, 3);
    }

    #[tokio::test]
    async fn metrics_for_empty_history_are_zero() {
        let (service, _repo) = service();
        let metrics = service.metrics(Uuid::new_v4()).await.unwrap();
        assert_eq!(metrics.meals_total, 0);
        assert_eq!(metrics.meals_on_diet, 0);
        assert_eq!(metrics.meals_off_diet, 0);
        assert_eq!(metrics.best_on_diet_sequence, 0);
    }
}
