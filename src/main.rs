mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};

use application::meal_service::MealService;
use application::session_service::SessionService;
use data::meal_repository::PostgresMealRepository;
use data::user_repository::PostgresUserRepository;
use domain::error::DomainError;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use presentation::handlers;
use presentation::middleware::{RequestLogMiddleware, SessionAuthMiddleware};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = AppConfig::from_env().expect("invalid configuration");
    let pool = create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");
    run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let meal_repo = Arc::new(PostgresMealRepository::new(pool.clone()));

    let session_service = SessionService::new(user_repo);
    let meal_service = MealService::new(meal_repo);

    let config_data = config.clone();

    HttpServer::new(move || {
        let cors = build_cors(&config_data);
        App::new()
            .wrap(RequestLogMiddleware)
            .wrap(cors)
            .app_data(web::Data::new(session_service.clone()))
            .app_data(web::Data::new(meal_service.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                DomainError::Validation(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                DomainError::Validation(err.to_string()).into()
            }))
            .service(
                web::scope("/meals")
                    .wrap(SessionAuthMiddleware::<PostgresUserRepository>::new())
                    .service(handlers::meal::create_meal)
                    .service(handlers::meal::get_metrics)
                    .service(handlers::meal::get_meals)
                    .service(handlers::meal::get_meal)
                    .service(handlers::meal::update_meal)
                    .service(handlers::meal::delete_meal),
            )
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
