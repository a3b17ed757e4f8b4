//! hearth-store - SQLite persistence for the hearth household manager
//!
//! This crate provides:
//! - `HearthStore`: thread-safe SQLite wrapper for households, chores,
//!   inventory, finance, recipes, meal plans, shopping lists, and the
//!   agent task log
//! - The weekly meal-plan generation heuristic

pub mod meal_planner;
pub mod store;
pub mod types;

pub use meal_planner::{MEAL_TYPES, PlannedMeal, plan_week};
pub use store::HearthStore;
pub use types::*;
