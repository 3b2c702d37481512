pub mod meal;
