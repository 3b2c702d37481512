use crate::application::meal_service::MealService;
use crate::data::meal_repository::PostgresMealRepository;
use crate::domain::error::DomainError;
use crate::presentation::dto::{MealBody, MealResponse, MealsResponse, MetricsResponse};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use tracing::info;
use uuid::Uuid;

#[post("")]
pub async fn create_meal(
    req: HttpRequest,
    user: AuthenticatedUser,
    meals: web::Data<MealService<PostgresMealRepository>>,
    payload: web::Json<MealBody>,
) -> Result<HttpResponse, DomainError> {
    let meal = meals.create_meal(user.id, payload.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        meal_id = %meal.id,
        "meal created"
    );

    Ok(HttpResponse::Created().finish())
}

#[put("/{id}")]
pub async fn update_meal(
    req: HttpRequest,
    user: AuthenticatedUser,
    meals: web::Data<MealService<PostgresMealRepository>>,
    payload: web::Json<MealBody>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let meal_id = path.into_inner();
    meals
        .update_meal(user.id, meal_id, payload.into_inner())
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        meal_id = %meal_id,
        "meal updated"
    );

    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{id}")]
pub async fn delete_meal(
    req: HttpRequest,
    user: AuthenticatedUser,
    meals: web::Data<MealService<PostgresMealRepository>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let meal_id = path.into_inner();
    meals.delete_meal(user.id, meal_id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        meal_id = %meal_id,
        "meal deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}

#[get("")]
pub async fn get_meals(
    user: AuthenticatedUser,
    meals: web::Data<MealService<PostgresMealRepository>>,
) -> Result<HttpResponse, DomainError> {
    let meals = meals.list_meals(user.id).await?;
    Ok(HttpResponse::Ok().json(MealsResponse { meals }))
}

#[get("/metrics")]
pub async fn get_metrics(
    user: AuthenticatedUser,
    meals: web::Data<MealService<PostgresMealRepository>>,
) -> Result<HttpResponse, DomainError> {
    let metrics = meals.metrics(user.id).await?;
    Ok(HttpResponse::Ok().json(MetricsResponse { metrics }))
}

#[get("/{id}")]
pub async fn get_meal(
    user: AuthenticatedUser,
    meals: web::Data<MealService<PostgresMealRepository>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let meal = meals.get_meal(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MealResponse { meal }))
}
