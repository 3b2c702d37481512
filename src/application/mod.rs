pub mod meal_service;
pub mod session_service;
