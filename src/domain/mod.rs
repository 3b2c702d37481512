pub mod error;
pub mod meal;
pub mod metrics;
pub mod user;
