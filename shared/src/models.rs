//! Data models for the calorie tracking engine

use crate::errors::{EntryIssue, NutritionError, NutritionResult};
use crate::validation::{
    normalize_category, validate_nutrient_amount, validate_quantity, VALID_MEAL_SLOTS,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Meal Slots
// ============================================================================

/// Meal slot of a logged entry
///
/// Variant order is the display order: breakfast < lunch < dinner < snack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }
}

impl FromStr for MealSlot {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_category(s, VALID_MEAL_SLOTS, "meal slot")
            .map_err(|msg| NutritionError::precondition("meal_slot", msg))?;
        MealSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == normalized)
            .ok_or_else(|| NutritionError::precondition("meal_slot", "unrecognized meal slot"))
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Nutrients
// ============================================================================

/// Energy and macronutrient amounts
///
/// Calories in kcal, everything else in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: Decimal,
    pub protein_g: Decimal,
    pub carbs_g: Decimal,
    pub fat_g: Decimal,
    pub fiber_g: Decimal,
}

impl Nutrients {
    pub const ZERO: Nutrients = Nutrients {
        calories: Decimal::ZERO,
        protein_g: Decimal::ZERO,
        carbs_g: Decimal::ZERO,
        fat_g: Decimal::ZERO,
        fiber_g: Decimal::ZERO,
    };

    pub fn new(calories: Decimal, protein_g: Decimal, carbs_g: Decimal, fat_g: Decimal, fiber_g: Decimal) -> Self {
        Self {
            calories,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g,
        }
    }

    /// Multiply every amount by `factor`, `None` on overflow
    pub fn checked_scale(&self, factor: Decimal) -> Option<Self> {
        Some(Self {
            calories: self.calories.checked_mul(factor)?,
            protein_g: self.protein_g.checked_mul(factor)?,
            carbs_g: self.carbs_g.checked_mul(factor)?,
            fat_g: self.fat_g.checked_mul(factor)?,
            fiber_g: self.fiber_g.checked_mul(factor)?,
        })
    }

    /// Field-wise sum, `None` on overflow
    pub fn checked_add(&self, rhs: &Nutrients) -> Option<Self> {
        Some(Self {
            calories: self.calories.checked_add(rhs.calories)?,
            protein_g: self.protein_g.checked_add(rhs.protein_g)?,
            carbs_g: self.carbs_g.checked_add(rhs.carbs_g)?,
            fat_g: self.fat_g.checked_add(rhs.fat_g)?,
            fiber_g: self.fiber_g.checked_add(rhs.fiber_g)?,
        })
    }

    pub fn checked_sum<'a, I>(items: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Nutrients>,
    {
        items
            .into_iter()
            .try_fold(Nutrients::ZERO, |acc, n| acc.checked_add(n))
    }

    /// Named amounts, in field order
    pub fn fields(&self) -> [(&'static str, Decimal); 5] {
        [
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fat_g", self.fat_g),
            ("fiber_g", self.fiber_g),
        ]
    }
}

// ============================================================================
// Food Items
// ============================================================================

/// Food category from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Protein,
    Carbohydrate,
    Vegetable,
    Fruit,
    Dairy,
    Grain,
    NutsSeeds,
    Beverage,
    Snack,
    Other,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 10] = [
        FoodCategory::Protein,
        FoodCategory::Carbohydrate,
        FoodCategory::Vegetable,
        FoodCategory::Fruit,
        FoodCategory::Dairy,
        FoodCategory::Grain,
        FoodCategory::NutsSeeds,
        FoodCategory::Beverage,
        FoodCategory::Snack,
        FoodCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Protein => "protein",
            FoodCategory::Carbohydrate => "carbohydrate",
            FoodCategory::Vegetable => "vegetable",
            FoodCategory::Fruit => "fruit",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Grain => "grain",
            FoodCategory::NutsSeeds => "nuts_seeds",
            FoodCategory::Beverage => "beverage",
            FoodCategory::Snack => "snack",
            FoodCategory::Other => "other",
        }
    }
}

impl FromStr for FoodCategory {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        FoodCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| {
                NutritionError::precondition("category", format!("Invalid food category '{}'", s))
            })
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference amount a food's nutrient values are expressed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientBasis {
    /// Values per 100 g; quantity is in grams
    #[default]
    Per100g,
    /// Values per serving; quantity is a number of servings
    PerServing,
}

impl NutrientBasis {
    /// Multiplier applied to the reference values for `quantity`
    pub fn scale_factor(&self, quantity: Decimal) -> Decimal {
        match self {
            NutrientBasis::Per100g => quantity / Decimal::ONE_HUNDRED,
            NutrientBasis::PerServing => quantity,
        }
    }

    pub fn quantity_unit(&self) -> &'static str {
        match self {
            NutrientBasis::Per100g => "g",
            NutrientBasis::PerServing => "serving",
        }
    }
}

/// Food catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: u32,
    pub name: String,
    pub category: FoodCategory,
    pub description: Option<String>,
    pub active: bool,
    pub basis: NutrientBasis,
    pub nutrients: Nutrients,
}

impl FoodItem {
    /// Nutrients for `quantity` grams or servings of this food
    pub fn nutrients_for(&self, quantity: Decimal) -> NutritionResult<Nutrients> {
        self.nutrients
            .checked_scale(self.basis.scale_factor(quantity))
            .ok_or_else(|| {
                NutritionError::precondition("quantity", format!("Quantity is too large for '{}'", self.name))
            })
    }
}

// ============================================================================
// Logged Entries
// ============================================================================

/// One food consumption event
///
/// Nutrient amounts are already scaled to `quantity`. The aggregator sums
/// them as they are and never rescales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEntry {
    pub food_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_id: Option<u32>,
    pub quantity: Decimal,
    pub date: NaiveDate,
    pub meal_slot: MealSlot,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

impl LoggedEntry {
    /// Log `quantity` of a catalog food
    pub fn from_food(food: &FoodItem, quantity: Decimal, date: NaiveDate, meal_slot: MealSlot) -> NutritionResult<Self> {
        if let Err(message) = validate_quantity(quantity) {
            return Err(NutritionError::precondition("quantity", message));
        }
        if !food.active {
            return Err(NutritionError::precondition(
                "food_id",
                format!("Food '{}' is no longer available", food.name),
            ));
        }

        let entry = Self {
            food_name: food.name.clone(),
            food_id: Some(food.id),
            quantity,
            date,
            meal_slot,
            nutrients: food.nutrients_for(quantity)?,
        };

        // Scaled amounts must pass the same checks as any other entry
        let issues = entry.issues(0);
        if issues.is_empty() {
            Ok(entry)
        } else {
            Err(NutritionError::MalformedEntry(issues))
        }
    }

    /// Everything wrong with this entry, tagged with its batch position
    pub fn issues(&self, index: usize) -> Vec<EntryIssue> {
        let mut issues = Vec::new();

        if let Err(message) = validate_quantity(self.quantity) {
            issues.push(EntryIssue::new(index, "quantity", message));
        }
        for (field, value) in self.nutrients.fields() {
            if let Err(message) = validate_nutrient_amount(value) {
                issues.push(EntryIssue::new(index, field, message));
            }
        }

        issues
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// Where the day's intake sits relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Below 80 % of target
    UnderTarget,
    /// 80 % up to but not including 100 %
    NearTarget,
    /// At or above target
    OverTarget,
}

impl ProgressStatus {
    pub fn from_progress(progress_percent: Decimal) -> Self {
        if progress_percent >= Decimal::ONE_HUNDRED {
            ProgressStatus::OverTarget
        } else if progress_percent >= Decimal::new(80, 0) {
            ProgressStatus::NearTarget
        } else {
            ProgressStatus::UnderTarget
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::UnderTarget => "under_target",
            ProgressStatus::NearTarget => "near_target",
            ProgressStatus::OverTarget => "over_target",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals for one calendar day against the calorie target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calories: Decimal,
    pub total_protein_g: Decimal,
    pub total_carbs_g: Decimal,
    pub total_fat_g: Decimal,
    pub total_fiber_g: Decimal,
    pub target_calories: i32,
    /// `max(target - total, 0)`
    pub remaining_calories: Decimal,
    /// `total / target * 100`, not capped at 100
    pub progress_percent: Decimal,
    pub entry_count: usize,
}

impl DailySummary {
    /// Build a summary from already-summed totals
    ///
    /// `target_calories` must be positive; [`crate::aggregate_day`] checks it.
    pub fn from_totals(
        date: NaiveDate,
        totals: Nutrients,
        target_calories: i32,
        entry_count: usize,
    ) -> NutritionResult<Self> {
        let target = Decimal::from(target_calories);
        let remaining_calories = (target - totals.calories).max(Decimal::ZERO);
        let progress_percent = totals
            .calories
            .checked_div(target)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(NutritionError::totals_out_of_range)?;

        Ok(Self {
            date,
            total_calories: totals.calories,
            total_protein_g: totals.protein_g,
            total_carbs_g: totals.carbs_g,
            total_fat_g: totals.fat_g,
            total_fiber_g: totals.fiber_g,
            target_calories,
            remaining_calories,
            progress_percent,
            entry_count,
        })
    }

    pub fn totals(&self) -> Nutrients {
        Nutrients::new(
            self.total_calories,
            self.total_protein_g,
            self.total_carbs_g,
            self.total_fat_g,
            self.total_fiber_g,
        )
    }

    /// Calories consumed beyond the target, zero when under
    pub fn overage(&self) -> Decimal {
        (self.total_calories - Decimal::from(self.target_calories)).max(Decimal::ZERO)
    }

    pub fn is_over_target(&self) -> bool {
        self.total_calories > Decimal::from(self.target_calories)
    }

    pub fn status(&self) -> ProgressStatus {
        ProgressStatus::from_progress(self.progress_percent)
    }

    /// Consumed minus target; negative when under
    pub fn difference(&self) -> Decimal {
        self.total_calories - Decimal::from(self.target_calories)
    }
}

/// Sums for one meal slot of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSlotSummary {
    pub date: NaiveDate,
    pub meal_slot: MealSlot,
    pub entry_count: usize,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

impl MealSlotSummary {
    pub fn empty(date: NaiveDate, meal_slot: MealSlot) -> Self {
        Self {
            date,
            meal_slot,
            entry_count: 0,
            nutrients: Nutrients::ZERO,
        }
    }

    pub(crate) fn add_entry(&mut self, entry: &LoggedEntry) -> NutritionResult<()> {
        self.nutrients = self
            .nutrients
            .checked_add(&entry.nutrients)
            .ok_or_else(NutritionError::totals_out_of_range)?;
        self.entry_count += 1;
        Ok(())
    }
}

/// Day-by-day summaries over an inclusive date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// One summary per day, empty days included
    pub days: Vec<DailySummary>,
    pub average_consumed: Decimal,
    pub average_target: Decimal,
    /// Average of consumed minus target
    pub average_difference: Decimal,
    /// Days with at least one entry
    pub days_logged: usize,
    pub days_over_target: usize,
}
