//! Calorie Tracker WASM Module
//!
//! Browser bindings for the nutrition engine. Entries cross the boundary as
//! JSON arrays of backend meal records; summaries come back as JSON.

use calorie_tracker_shared::{
    aggregate_day as aggregate_entries, compute_daily_target as daily_target, entries_from_records,
    group_by_meal_slot as group_entries, ActivityLevel, BiologicalSex, GoalCategory, MealRecord, NutritionError,
    Profile,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Daily calorie target for a profile
///
/// `sex`, `activity` and `goal` accept the same spellings as the backend,
/// e.g. "female", "moderately_active", "lose".
#[wasm_bindgen]
pub fn compute_daily_target(
    age_years: i32,
    sex: &str,
    height_cm: f64,
    weight_kg: f64,
    activity: &str,
    goal: &str,
) -> Result<i32, JsError> {
    target_for(age_years, sex, height_cm, weight_kg, activity, goal).map_err(to_js)
}

/// Daily summary for `date` (YYYY-MM-DD) as JSON
#[wasm_bindgen]
pub fn aggregate_day(records_json: &str, target_calories: i32, date: &str) -> Result<String, JsError> {
    summary_json(records_json, target_calories, date).map_err(to_js)
}

/// Per (date, meal slot) totals as JSON
#[wasm_bindgen]
pub fn group_by_meal_slot(records_json: &str) -> Result<String, JsError> {
    groups_json(records_json).map_err(to_js)
}

/// Human readable description of an activity level
#[wasm_bindgen]
pub fn activity_level_description(activity: &str) -> Result<String, JsError> {
    activity
        .parse::<ActivityLevel>()
        .map(|level| level.description().to_string())
        .map_err(|e| to_js(e.to_string()))
}

fn to_js(message: String) -> JsError {
    JsError::new(&message)
}

fn target_for(
    age_years: i32,
    sex: &str,
    height_cm: f64,
    weight_kg: f64,
    activity: &str,
    goal: &str,
) -> Result<i32, String> {
    let profile = parse_profile(age_years, sex, height_cm, weight_kg, activity, goal).map_err(|e| e.to_string())?;
    Ok(daily_target(&profile))
}

fn parse_profile(
    age_years: i32,
    sex: &str,
    height_cm: f64,
    weight_kg: f64,
    activity: &str,
    goal: &str,
) -> Result<Profile, NutritionError> {
    Profile::new(
        age_years,
        sex.parse::<BiologicalSex>()?,
        height_cm,
        weight_kg,
        activity.parse::<ActivityLevel>()?,
        goal.parse::<GoalCategory>()?,
    )
}

fn parse_records(records_json: &str) -> Result<Vec<MealRecord>, String> {
    serde_json::from_str(records_json).map_err(|e| format!("Invalid meal records: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn summary_json(records_json: &str, target_calories: i32, date: &str) -> Result<String, String> {
    let date = date
        .parse()
        .map_err(|_| format!("Invalid date: {}", date))?;
    let entries = entries_from_records(parse_records(records_json)?).map_err(|e| e.to_string())?;
    let summary = aggregate_entries(&entries, target_calories, date).map_err(|e| e.to_string())?;
    to_json(&summary)
}

fn groups_json(records_json: &str) -> Result<String, String> {
    let entries = entries_from_records(parse_records(records_json)?).map_err(|e| e.to_string())?;
    to_json(&group_entries(&entries).map_err(|e| e.to_string())?)
}
