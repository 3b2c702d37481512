pub mod meal_repository;
pub mod user_repository;
