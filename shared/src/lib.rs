//! Calorie Tracker Shared Library
//!
//! Pure nutrition engine used by the tracker CLI and the WASM module:
//! energy target calculation, per-day and per-meal-slot aggregation, the
//! food catalog and conversions from remote-store records.

pub mod aggregate;
pub mod catalog;
pub mod energy;
pub mod errors;
pub mod models;
pub mod records;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use aggregate::*;
pub use catalog::{FoodCatalog, NewFoodItem};
pub use energy::*;
pub use errors::*;
pub use models::*;
pub use records::{entries_from_records, MealRecord, ProfileRecord};
pub use units::*;
