//! Input validation functions
//!
//! Range checks for profile fields, calorie targets and logged amounts.
//! The energy and aggregation functions assume these have passed; they do
//! not re-check their inputs.

use crate::errors::NutritionError;
use rust_decimal::Decimal;

/// Youngest age the energy formulas are used for
pub const MIN_AGE_YEARS: i32 = 16;
/// Oldest age the energy formulas are used for
pub const MAX_AGE_YEARS: i32 = 100;
/// Largest quantity one entry may log, in grams or servings
pub const MAX_QUANTITY: i64 = 10_000;
/// Largest nutrient amount one entry may carry, in kcal or grams
pub const MAX_NUTRIENT_AMOUNT: i64 = 50_000;

/// Validate age in years
pub fn validate_age(age_years: i32) -> Result<(), String> {
    if age_years < MIN_AGE_YEARS {
        return Err(format!("Age must be at least {} years", MIN_AGE_YEARS));
    }
    if age_years > MAX_AGE_YEARS {
        return Err(format!("Age must be at most {} years", MAX_AGE_YEARS));
    }
    Ok(())
}

/// Validate height value (in cm)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm <= 0.0 {
        return Err("Height must be positive".to_string());
    }
    Ok(())
}

/// Validate weight value (in kg)
pub fn validate_weight_kg(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg <= 0.0 {
        return Err("Weight must be positive".to_string());
    }
    Ok(())
}

/// Validate a daily calorie target
pub fn validate_target_calories(target: i32) -> Result<(), String> {
    if target <= 0 {
        return Err("Calorie target must be positive".to_string());
    }
    Ok(())
}

/// Validate a logged quantity (grams or servings)
pub fn validate_quantity(quantity: Decimal) -> Result<(), String> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive".to_string());
    }
    if quantity > Decimal::from(MAX_QUANTITY) {
        return Err(format!("Quantity unreasonably high (max {})", MAX_QUANTITY));
    }
    Ok(())
}

/// Validate a nutrient amount (kcal or grams)
pub fn validate_nutrient_amount(value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO {
        return Err("Value cannot be negative".to_string());
    }
    if value > Decimal::from(MAX_NUTRIENT_AMOUNT) {
        return Err(format!("Value unreasonably high (max {})", MAX_NUTRIENT_AMOUNT));
    }
    Ok(())
}

/// Convert a float coming from a loosely typed record into a decimal
pub fn decimal_from_f64(value: f64) -> Result<Decimal, String> {
    if value.is_nan() || value.is_infinite() {
        return Err("Value must be a valid number".to_string());
    }
    Decimal::try_from(value).map_err(|_| "Value is out of range".to_string())
}

/// Valid activity levels
pub const VALID_ACTIVITY_LEVELS: &[&str] = &[
    "sedentary",
    "lightly_active",
    "moderately_active",
    "very_active",
    "extra_active",
];

/// Valid biological sex values
pub const VALID_BIOLOGICAL_SEX: &[&str] = &["male", "female"];

/// Valid goal categories
pub const VALID_GOALS: &[&str] = &["lose", "maintain", "gain"];

/// Valid meal slots
pub const VALID_MEAL_SLOTS: &[&str] = &["breakfast", "lunch", "dinner", "snack"];

/// Lowercase a category name and check it against the allowed set
///
/// Returns the normalized name on success.
pub fn normalize_category(value: &str, allowed: &[&str], kind: &str) -> Result<String, String> {
    let normalized = value.trim().to_lowercase();
    if allowed.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(format!(
            "Invalid {} '{}'. Must be one of: {}",
            kind,
            value,
            allowed.join(", ")
        ))
    }
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "age" | "age_years" => "Age",
        "weight" | "weight_kg" => "Current Weight",
        "height" | "height_cm" => "Height",
        "sex" | "biological_sex" => "Biological Sex",
        "activity_level" => "Activity Level",
        "goal" => "Goal",
        "target_calories" => "Daily Calorie Target",
        "quantity" => "Quantity",
        "calories" => "Calories",
        "protein" | "protein_g" => "Protein",
        "carbs" | "carbs_g" => "Carbohydrates",
        "fat" | "fat_g" => "Fat",
        "fiber" | "fiber_g" => "Fiber",
        "meal_slot" | "meal_type" => "Meal",
        "date" | "meal_date" => "Date",
        "food_name" => "Food",
        "entries" => "Entries",
        "date_range" => "Date Range",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

impl From<ValidationError> for NutritionError {
    fn from(err: ValidationError) -> Self {
        NutritionError::PreconditionViolation {
            field: err.field,
            message: err.message,
        }
    }
}

/// Run a validator and tag its failure with the field name
pub fn check<T>(field: &str, value: T, f: impl FnOnce(T) -> Result<(), String>) -> Result<(), ValidationError> {
    f(value).map_err(|message| ValidationError::new(field, &message))
}
