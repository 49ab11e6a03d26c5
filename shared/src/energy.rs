//! Daily energy target calculation
//!
//! Converts a biometric profile plus activity and goal selections into a
//! daily calorie target:
//!
//! 1. Basal metabolic rate by the Mifflin-St Jeor equation
//! 2. Total daily energy expenditure = BMR × activity multiplier
//! 3. Goal offset: lose −500, gain +500, maintain unchanged
//! 4. Rounded half away from zero
//!
//! All functions here are pure. Categories are parsed strictly: an unknown
//! activity level or goal is an error, never a default.

use crate::errors::{NutritionError, NutritionResult};
use crate::validation::{
    check, normalize_category, validate_age, validate_height_cm, validate_weight_kg,
    VALID_ACTIVITY_LEVELS, VALID_BIOLOGICAL_SEX, VALID_GOALS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calories added to or removed from TDEE for a gain or lose goal
pub const GOAL_CALORIE_ADJUSTMENT: f64 = 500.0;

// ============================================================================
// Profile Categories
// ============================================================================

/// Biological sex, used only to pick the BMR formula branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

impl BiologicalSex {
    pub const ALL: [BiologicalSex; 2] = [BiologicalSex::Male, BiologicalSex::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            BiologicalSex::Male => "male",
            BiologicalSex::Female => "female",
        }
    }
}

impl FromStr for BiologicalSex {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_category(s, VALID_BIOLOGICAL_SEX, "biological sex")
            .map_err(|msg| NutritionError::precondition("sex", msg))?;
        BiologicalSex::ALL
            .into_iter()
            .find(|sex| sex.as_str() == normalized)
            .ok_or_else(|| NutritionError::precondition("sex", "unrecognized biological sex"))
    }
}

impl fmt::Display for BiologicalSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported activity level, mapped to a TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Desk job, little or no exercise
    Sedentary,
    /// Light exercise 1 to 3 days a week
    LightlyActive,
    /// Moderate exercise 3 to 5 days a week
    ModeratelyActive,
    /// Hard exercise most days
    VeryActive,
    /// Physical job or training twice a day
    ExtraActive,
}

impl ActivityLevel {
    /// Every level, least to most active
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// Factor applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::LightlyActive => "Light exercise 1-3 days/week",
            ActivityLevel::ModeratelyActive => "Moderate exercise 3-5 days/week",
            ActivityLevel::VeryActive => "Hard exercise 6-7 days/week",
            ActivityLevel::ExtraActive => "Very hard exercise, physical job",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_category(s, VALID_ACTIVITY_LEVELS, "activity level")
            .map_err(|msg| NutritionError::precondition("activity_level", msg))?;
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| NutritionError::precondition("activity_level", "unrecognized activity level"))
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight goal selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Lose,
    Maintain,
    Gain,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 3] = [GoalCategory::Lose, GoalCategory::Maintain, GoalCategory::Gain];

    /// Calories applied to TDEE for this goal
    pub fn calorie_offset(&self) -> f64 {
        match self {
            GoalCategory::Lose => -GOAL_CALORIE_ADJUSTMENT,
            GoalCategory::Maintain => 0.0,
            GoalCategory::Gain => GOAL_CALORIE_ADJUSTMENT,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GoalCategory::Lose => "Lose weight (~0.5 kg per week)",
            GoalCategory::Maintain => "Maintain current weight",
            GoalCategory::Gain => "Gain weight (~0.5 kg per week)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::Lose => "lose",
            GoalCategory::Maintain => "maintain",
            GoalCategory::Gain => "gain",
        }
    }
}

impl FromStr for GoalCategory {
    type Err = NutritionError;

    /// Accepts `lose`, `maintain`, `gain` in any case, plus the remote
    /// API's `LOSS` spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("loss") {
            return Ok(GoalCategory::Lose);
        }
        let normalized = normalize_category(trimmed, VALID_GOALS, "goal")
            .map_err(|msg| NutritionError::precondition("goal", msg))?;
        GoalCategory::ALL
            .into_iter()
            .find(|goal| goal.as_str() == normalized)
            .ok_or_else(|| NutritionError::precondition("goal", "unrecognized goal"))
    }
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Biometric profile consumed by the energy calculator
///
/// Preconditions for [`compute_daily_target`]: age within 16–100 years,
/// height and weight positive and finite. [`Profile::new`] enforces them;
/// values built field by field should go through [`Profile::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age_years: i32,
    pub sex: BiologicalSex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: GoalCategory,
}

impl Profile {
    /// Build a profile, rejecting out-of-range biometrics
    pub fn new(
        age_years: i32,
        sex: BiologicalSex,
        height_cm: f64,
        weight_kg: f64,
        activity_level: ActivityLevel,
        goal: GoalCategory,
    ) -> NutritionResult<Self> {
        let profile = Self {
            age_years,
            sex,
            height_cm,
            weight_kg,
            activity_level,
            goal,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check the calculator's preconditions
    pub fn validate(&self) -> NutritionResult<()> {
        check("age", self.age_years, validate_age)?;
        check("height_cm", self.height_cm, validate_height_cm)?;
        check("weight_kg", self.weight_kg, validate_weight_kg)?;
        Ok(())
    }

    /// Copy with a different goal
    pub fn with_goal(mut self, goal: GoalCategory) -> Self {
        self.goal = goal;
        self
    }
}

// ============================================================================
// BMR, TDEE and Target
// ============================================================================

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: i32, sex: BiologicalSex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    match sex {
        BiologicalSex::Male => base + 5.0,
        BiologicalSex::Female => base - 161.0,
    }
}

/// TDEE = BMR × activity multiplier
pub fn calculate_tdee(profile: &Profile) -> f64 {
    let bmr = calculate_bmr_mifflin(profile.weight_kg, profile.height_cm, profile.age_years, profile.sex);
    bmr * profile.activity_level.multiplier()
}

/// Daily calorie target in kcal
///
/// Pure and deterministic. The profile is not re-validated here; see
/// [`Profile`] for the preconditions.
pub fn compute_daily_target(profile: &Profile) -> i32 {
    let adjusted = calculate_tdee(profile) + profile.goal.calorie_offset();
    // f64::round rounds half away from zero
    adjusted.round() as i32
}

/// Every intermediate value of the target calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    pub bmr: f64,
    pub activity_multiplier: f64,
    pub tdee: f64,
    pub goal_offset: f64,
    pub target_calories: i32,
}

/// Calculate the target along with its intermediate values
pub fn compute_energy_breakdown(profile: &Profile) -> EnergyBreakdown {
    let bmr = calculate_bmr_mifflin(profile.weight_kg, profile.height_cm, profile.age_years, profile.sex);
    let activity_multiplier = profile.activity_level.multiplier();
    let tdee = bmr * activity_multiplier;

    EnergyBreakdown {
        bmr,
        activity_multiplier,
        tdee,
        goal_offset: profile.goal.calorie_offset(),
        target_calories: compute_daily_target(profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn reference_profile(goal: GoalCategory) -> Profile {
        Profile::new(
            25,
            BiologicalSex::Male,
            170.0,
            70.0,
            ActivityLevel::ModeratelyActive,
            goal,
        )
        .unwrap()
    }

    #[test]
    fn test_reference_bmr_and_tdee() {
        let profile = reference_profile(GoalCategory::Maintain);
        let bmr = calculate_bmr_mifflin(70.0, 170.0, 25, BiologicalSex::Male);
        assert_eq!(bmr, 1642.5);
        assert!((calculate_tdee(&profile) - 2545.875).abs() < 1e-9);
    }

    #[rstest]
    #[case(GoalCategory::Maintain, 2546)]
    #[case(GoalCategory::Lose, 2046)]
    #[case(GoalCategory::Gain, 3046)]
    fn test_reference_targets(#[case] goal: GoalCategory, #[case] expected: i32) {
        assert_eq!(compute_daily_target(&reference_profile(goal)), expected);
    }

    #[test]
    fn test_female_branch() {
        // 10*60 + 6.25*165 - 5*30 - 161 = 1320.25; * 1.2 = 1584.3
        let profile = Profile::new(
            30,
            BiologicalSex::Female,
            165.0,
            60.0,
            ActivityLevel::Sedentary,
            GoalCategory::Maintain,
        )
        .unwrap();
        assert_eq!(compute_daily_target(&profile), 1584);
    }

    #[test]
    fn test_fractional_tdee_rounds_up() {
        // 600 + 1000 - 150 - 161 = 1289; * 1.2 = 1546.8
        let profile = Profile::new(
            30,
            BiologicalSex::Female,
            160.0,
            60.0,
            ActivityLevel::Sedentary,
            GoalCategory::Maintain,
        )
        .unwrap();
        assert_eq!(compute_daily_target(&profile), 1547);
    }

    #[test]
    fn test_energy_breakdown() {
        let breakdown = compute_energy_breakdown(&reference_profile(GoalCategory::Lose));
        assert_eq!(breakdown.bmr, 1642.5);
        assert_eq!(breakdown.activity_multiplier, 1.55);
        assert!((breakdown.tdee - 2545.875).abs() < 1e-9);
        assert_eq!(breakdown.goal_offset, -500.0);
        assert_eq!(breakdown.target_calories, 2046);
    }

    #[rstest]
    #[case("sedentary", ActivityLevel::Sedentary)]
    #[case("lightly_active", ActivityLevel::LightlyActive)]
    #[case("MODERATELY_ACTIVE", ActivityLevel::ModeratelyActive)]
    #[case("Very_Active", ActivityLevel::VeryActive)]
    #[case("extra_active", ActivityLevel::ExtraActive)]
    fn test_activity_level_parsing(#[case] input: &str, #[case] expected: ActivityLevel) {
        assert_eq!(input.parse::<ActivityLevel>().unwrap(), expected);
    }

    #[rstest]
    #[case("active")]
    #[case("moderate")]
    #[case("")]
    fn test_unknown_activity_level_fails_fast(#[case] input: &str) {
        let err = input.parse::<ActivityLevel>().unwrap_err();
        assert!(matches!(
            err,
            NutritionError::PreconditionViolation { ref field, .. } if field == "activity_level"
        ));
    }

    #[test]
    fn test_goal_parsing() {
        assert_eq!("lose".parse::<GoalCategory>().unwrap(), GoalCategory::Lose);
        assert_eq!("LOSS".parse::<GoalCategory>().unwrap(), GoalCategory::Lose);
        assert_eq!("Maintain".parse::<GoalCategory>().unwrap(), GoalCategory::Maintain);
        assert_eq!("GAIN".parse::<GoalCategory>().unwrap(), GoalCategory::Gain);
        assert!(matches!(
            "bulk".parse::<GoalCategory>(),
            Err(NutritionError::PreconditionViolation { .. })
        ));
    }

    #[test]
    fn test_sex_parsing() {
        assert_eq!("MALE".parse::<BiologicalSex>().unwrap(), BiologicalSex::Male);
        assert_eq!("female".parse::<BiologicalSex>().unwrap(), BiologicalSex::Female);
        assert!("unknown".parse::<BiologicalSex>().is_err());
    }

    #[test]
    fn test_every_category_parses_from_its_own_name() {
        for sex in BiologicalSex::ALL {
            assert_eq!(sex.as_str().parse::<BiologicalSex>().unwrap(), sex);
            assert_eq!(sex.to_string().to_uppercase().parse::<BiologicalSex>().unwrap(), sex);
        }
        for goal in GoalCategory::ALL {
            assert_eq!(goal.as_str().parse::<GoalCategory>().unwrap(), goal);
        }
        for level in ActivityLevel::ALL {
            assert_eq!(level.as_str().parse::<ActivityLevel>().unwrap(), level);
        }
        assert!(matches!(
            "other".parse::<BiologicalSex>(),
            Err(NutritionError::PreconditionViolation { ref field, .. }) if field == "sex"
        ));
    }

    #[test]
    fn test_activity_table_has_five_levels() {
        let multipliers: Vec<f64> = ActivityLevel::ALL.iter().map(|l| l.multiplier()).collect();
        assert_eq!(multipliers, vec![1.2, 1.375, 1.55, 1.725, 1.9]);
        assert_eq!(ActivityLevel::Sedentary.description(), "Little or no exercise");
    }

    #[test]
    fn test_profile_new_rejects_out_of_range() {
        let build = |age, height, weight| {
            Profile::new(
                age,
                BiologicalSex::Female,
                height,
                weight,
                ActivityLevel::Sedentary,
                GoalCategory::Maintain,
            )
        };
        assert!(build(15, 160.0, 55.0).is_err());
        assert!(build(101, 160.0, 55.0).is_err());
        assert!(build(30, 0.0, 55.0).is_err());
        assert!(build(30, 160.0, -2.0).is_err());
        assert!(build(30, 160.0, f64::NAN).is_err());
        assert!(build(30, 160.0, 55.0).is_ok());
    }

    #[test]
    fn test_serde_names() {
        let profile = reference_profile(GoalCategory::Gain);
        let json = serde_json::to_value(profile).unwrap();
        assert_eq!(json["activity_level"], "moderately_active");
        assert_eq!(json["sex"], "male");
        assert_eq!(json["goal"], "gain");
    }

    fn activity_strategy() -> impl Strategy<Value = ActivityLevel> {
        prop::sample::select(ActivityLevel::ALL.to_vec())
    }

    fn goal_strategy() -> impl Strategy<Value = GoalCategory> {
        prop::sample::select(vec![GoalCategory::Lose, GoalCategory::Maintain, GoalCategory::Gain])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: identical profiles always give identical targets
        #[test]
        fn prop_target_deterministic(
            age in 16i32..=100,
            height in 140.0f64..210.0,
            weight in 40.0f64..150.0,
            activity in activity_strategy(),
            goal in goal_strategy(),
        ) {
            let profile = Profile::new(age, BiologicalSex::Male, height, weight, activity, goal).unwrap();
            prop_assert_eq!(compute_daily_target(&profile), compute_daily_target(&Profile { ..profile }));
        }

        /// Property: lose and gain sit 500 kcal either side of maintain (±1 for rounding)
        #[test]
        fn prop_goal_offsets(
            age in 16i32..=100,
            height in 140.0f64..210.0,
            weight in 40.0f64..150.0,
            activity in activity_strategy(),
        ) {
            let base = Profile::new(age, BiologicalSex::Female, height, weight, activity, GoalCategory::Maintain).unwrap();
            let maintain = compute_daily_target(&base);
            let lose = compute_daily_target(&base.with_goal(GoalCategory::Lose));
            let gain = compute_daily_target(&base.with_goal(GoalCategory::Gain));
            prop_assert!((maintain - lose - 500).abs() <= 1);
            prop_assert!((gain - maintain - 500).abs() <= 1);
        }

        /// Property: male BMR exceeds female BMR by exactly 166 kcal
        #[test]
        fn prop_male_bmr_higher(
            weight in 50.0f64..100.0,
            height in 160.0f64..190.0,
            age in 20i32..60
        ) {
            let male = calculate_bmr_mifflin(weight, height, age, BiologicalSex::Male);
            let female = calculate_bmr_mifflin(weight, height, age, BiologicalSex::Female);
            prop_assert!((male - female - 166.0).abs() < 1e-9);
        }

        /// Property: a more active level never lowers the target
        #[test]
        fn prop_activity_monotonic(
            age in 16i32..=100,
            height in 140.0f64..210.0,
            weight in 40.0f64..150.0,
        ) {
            let targets: Vec<i32> = ActivityLevel::ALL
                .iter()
                .map(|&level| {
                    let profile = Profile::new(age, BiologicalSex::Male, height, weight, level, GoalCategory::Maintain).unwrap();
                    compute_daily_target(&profile)
                })
                .collect();
            prop_assert!(targets.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
