//! Common fixtures for integration tests

#![allow(dead_code)]

use calorie_tracker::SessionContext;
use calorie_tracker_shared::{
    ActivityLevel, BiologicalSex, GoalCategory, LoggedEntry, MealSlot, Nutrients, Profile,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Target for the reference profile with a maintain goal
pub const MAINTAIN_TARGET: i32 = 2546;

/// 25 year old male, 170 cm, 70 kg, moderately active
pub fn reference_profile(goal: GoalCategory) -> Profile {
    Profile::new(25, BiologicalSex::Male, 170.0, 70.0, ActivityLevel::ModeratelyActive, goal)
        .expect("reference profile is valid")
}

/// Session with the reference profile already set
pub fn session_with_profile(goal: GoalCategory) -> SessionContext {
    let mut session = SessionContext::new(32);
    session
        .set_profile(reference_profile(goal))
        .expect("reference profile is accepted");
    session
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).expect("valid March date")
}

pub fn entry(date: NaiveDate, slot: MealSlot, calories: i64, protein_g: i64) -> LoggedEntry {
    LoggedEntry {
        food_name: format!("{} item", slot),
        food_id: None,
        quantity: Decimal::from(100),
        date,
        meal_slot: slot,
        nutrients: Nutrients::new(
            Decimal::from(calories),
            Decimal::from(protein_g),
            Decimal::from(10),
            Decimal::from(5),
            Decimal::ONE,
        ),
    }
}

/// A few days of mixed meals
pub fn sample_week() -> Vec<LoggedEntry> {
    vec![
        entry(day(1), MealSlot::Breakfast, 400, 20),
        entry(day(1), MealSlot::Lunch, 800, 35),
        entry(day(1), MealSlot::Dinner, 900, 40),
        entry(day(3), MealSlot::Lunch, 700, 30),
        entry(day(3), MealSlot::Snack, 250, 5),
        entry(day(5), MealSlot::Dinner, 2800, 60),
    ]
}
