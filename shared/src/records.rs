//! Loosely typed records from the remote profile and meal-log stores
//!
//! Remote payloads use camelCase keys, upper-case enum names and plain
//! floats, and any field may be missing. These records accept that shape
//! and convert into the engine's checked types.

use crate::energy::{ActivityLevel, BiologicalSex, GoalCategory, Profile};
use crate::errors::{EntryIssue, NutritionError, NutritionResult};
use crate::models::{LoggedEntry, MealSlot, Nutrients};
use crate::units::{HeightUnit, WeightUnit};
use crate::validation::{decimal_from_f64, validate_nutrient_amount, validate_quantity};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User profile as stored remotely
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub age: Option<i32>,
    #[serde(alias = "sex")]
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub height_unit: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    /// Target the store last computed; informational only
    pub daily_calorie_target: Option<i32>,
}

fn required<T>(value: Option<T>, field: &str) -> NutritionResult<T> {
    value.ok_or_else(|| NutritionError::precondition(field, "is required"))
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = NutritionError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let height_unit = match record.height_unit.as_deref() {
            Some(unit) => unit.parse::<HeightUnit>()?,
            None => HeightUnit::Cm,
        };
        let weight_unit = match record.weight_unit.as_deref() {
            Some(unit) => unit.parse::<WeightUnit>()?,
            None => WeightUnit::Kg,
        };

        let age = required(record.age, "age")?;
        let sex: BiologicalSex = required(record.gender, "sex")?.parse()?;
        let height_cm = height_unit.to_cm(required(record.height, "height")?);
        let weight_kg = weight_unit.to_kg(required(record.weight, "weight")?);
        let activity: ActivityLevel = required(record.activity_level, "activity_level")?.parse()?;
        let goal: GoalCategory = required(record.goal, "goal")?.parse()?;

        Profile::new(age, sex, height_cm, weight_kg, activity, goal)
    }
}

impl From<&Profile> for ProfileRecord {
    fn from(profile: &Profile) -> Self {
        Self {
            age: Some(profile.age_years),
            gender: Some(profile.sex.to_string()),
            height: Some(profile.height_cm),
            height_unit: Some(HeightUnit::Cm.to_string()),
            weight: Some(profile.weight_kg),
            weight_unit: Some(WeightUnit::Kg.to_string()),
            activity_level: Some(profile.activity_level.to_string()),
            goal: Some(profile.goal.to_string()),
            daily_calorie_target: None,
        }
    }
}

/// Meal log row as stored remotely
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    pub id: Option<i64>,
    pub food_id: Option<u32>,
    pub food_name: Option<String>,
    pub meal_type: Option<String>,
    pub quantity: Option<f64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    /// `YYYY-MM-DD`, or an ISO timestamp whose date part is used as is
    pub meal_date: Option<String>,
}

struct IssueCollector {
    index: usize,
    issues: Vec<EntryIssue>,
}

impl IssueCollector {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(EntryIssue::new(self.index, field, message));
    }

    fn amount(
        &mut self,
        field: &str,
        value: Option<f64>,
        required: bool,
        check: fn(Decimal) -> Result<(), String>,
    ) -> Decimal {
        let Some(raw) = value else {
            if required {
                self.push(field, "is required");
            }
            return Decimal::ZERO;
        };
        match decimal_from_f64(raw).and_then(|v| check(v).map(|()| v)) {
            Ok(v) => v,
            Err(msg) => {
                self.push(field, msg);
                Decimal::ZERO
            }
        }
    }
}

fn parse_meal_date(raw: &str) -> Result<NaiveDate, String> {
    let day = raw.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| format!("Invalid date '{}'", raw))
}

impl MealRecord {
    /// Convert into a checked entry
    ///
    /// `index` is the record's position in its batch and tags every issue.
    /// Macros may be absent and count as zero; calories, quantity, meal
    /// type and date are required.
    pub fn into_entry(self, index: usize) -> Result<LoggedEntry, Vec<EntryIssue>> {
        let mut collector = IssueCollector {
            index,
            issues: Vec::new(),
        };

        let quantity = collector.amount("quantity", self.quantity, true, validate_quantity);
        let nutrients = Nutrients::new(
            collector.amount("calories", self.calories, true, validate_nutrient_amount),
            collector.amount("protein_g", self.protein, false, validate_nutrient_amount),
            collector.amount("carbs_g", self.carbs, false, validate_nutrient_amount),
            collector.amount("fat_g", self.fat, false, validate_nutrient_amount),
            collector.amount("fiber_g", self.fiber, false, validate_nutrient_amount),
        );

        let meal_slot = match self.meal_type.as_deref() {
            Some(raw) => raw.parse::<MealSlot>().ok().or_else(|| {
                collector.push("meal_slot", format!("Invalid meal type '{}'", raw));
                None
            }),
            None => {
                collector.push("meal_slot", "is required");
                None
            }
        };

        let date = match self.meal_date.as_deref() {
            Some(raw) => parse_meal_date(raw).map_err(|msg| collector.push("date", msg)).ok(),
            None => {
                collector.push("date", "is required");
                None
            }
        };

        let food_name = self
            .food_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unnamed food".to_string());

        match (meal_slot, date) {
            (Some(meal_slot), Some(date)) if collector.issues.is_empty() => Ok(LoggedEntry {
                food_name,
                food_id: self.food_id,
                quantity,
                date,
                meal_slot,
                nutrients,
            }),
            _ => Err(collector.issues),
        }
    }
}

/// Convert a whole batch, rejecting it if any record is malformed
pub fn entries_from_records(records: Vec<MealRecord>) -> NutritionResult<Vec<LoggedEntry>> {
    let mut entries = Vec::with_capacity(records.len());
    let mut issues = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        match record.into_entry(index) {
            Ok(entry) => entries.push(entry),
            Err(found) => issues.extend(found),
        }
    }

    if issues.is_empty() {
        Ok(entries)
    } else {
        Err(NutritionError::MalformedEntry(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::compute_daily_target;

    fn meal_json() -> &'static str {
        r#"{
            "id": 42,
            "userId": 7,
            "foodId": 1,
            "foodName": "Grilled Chicken Breast",
            "mealType": "LUNCH",
            "quantity": 150,
            "calories": 247.5,
            "protein": 46.5,
            "carbs": 0,
            "fat": 5.4,
            "fiber": 0,
            "mealDate": "2024-03-15",
            "createdAt": "2024-03-15T12:30:00"
        }"#
    }

    #[test]
    fn test_profile_record_converts() {
        let record: ProfileRecord = serde_json::from_str(
            r#"{"age": 25, "gender": "male", "height": 170, "weight": 70,
                "activityLevel": "MODERATELY_ACTIVE", "goal": "LOSE", "dailyCalorieTarget": 2046}"#,
        )
        .unwrap();
        let profile = Profile::try_from(record).unwrap();
        assert_eq!(profile.activity_level, ActivityLevel::ModeratelyActive);
        assert_eq!(compute_daily_target(&profile), 2046);
    }

    #[test]
    fn test_profile_record_units() {
        let record = ProfileRecord {
            age: Some(30),
            gender: Some("female".to_string()),
            height: Some(1.65),
            height_unit: Some("m".to_string()),
            weight: Some(132.0),
            weight_unit: Some("lbs".to_string()),
            activity_level: Some("sedentary".to_string()),
            goal: Some("maintain".to_string()),
            daily_calorie_target: None,
        };
        let profile = Profile::try_from(record).unwrap();
        assert!((profile.height_cm - 165.0).abs() < 1e-9);
        assert!((profile.weight_kg - 59.874193).abs() < 1e-5);
    }

    #[test]
    fn test_profile_record_missing_and_unknown() {
        let missing = ProfileRecord {
            age: Some(30),
            ..Default::default()
        };
        let err = Profile::try_from(missing).unwrap_err();
        assert!(matches!(err, NutritionError::PreconditionViolation { ref field, .. } if field == "sex"));

        let mut record = ProfileRecord::from(
            &Profile::new(
                40,
                BiologicalSex::Male,
                180.0,
                85.0,
                ActivityLevel::VeryActive,
                GoalCategory::Gain,
            )
            .unwrap(),
        );
        assert!(Profile::try_from(record.clone()).is_ok());

        record.activity_level = Some("couch_potato".to_string());
        let err = Profile::try_from(record).unwrap_err();
        assert!(matches!(
            err,
            NutritionError::PreconditionViolation { ref field, .. } if field == "activity_level"
        ));
    }

    #[test]
    fn test_meal_record_converts() {
        let record: MealRecord = serde_json::from_str(meal_json()).unwrap();
        let entry = record.into_entry(0).unwrap();
        assert_eq!(entry.meal_slot, MealSlot::Lunch);
        assert_eq!(entry.food_id, Some(1));
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(entry.nutrients.calories, Decimal::new(2475, 1));
        assert_eq!(entry.quantity, Decimal::from(150));
    }

    #[test]
    fn test_meal_record_timestamp_date() {
        let record = MealRecord {
            meal_date: Some("2024-03-15T23:59:00".to_string()),
            ..serde_json::from_str(meal_json()).unwrap()
        };
        let entry = record.into_entry(0).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_meal_record_reports_every_problem() {
        let record = MealRecord {
            quantity: Some(0.0),
            calories: None,
            fat: Some(f64::NAN),
            meal_type: Some("brunch".to_string()),
            ..serde_json::from_str(meal_json()).unwrap()
        };
        let issues = record.into_entry(3).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["quantity", "calories", "fat_g", "meal_slot"]);
        assert!(issues.iter().all(|i| i.index == 3));

        let negative = MealRecord {
            quantity: Some(-2.0),
            protein: Some(-1.0),
            ..serde_json::from_str(meal_json()).unwrap()
        };
        let fields: Vec<_> = negative
            .into_entry(0)
            .unwrap_err()
            .into_iter()
            .map(|i| i.field)
            .collect();
        assert_eq!(fields, vec!["quantity", "protein_g"]);
    }

    #[test]
    fn test_entries_from_records_rejects_whole_batch() {
        let good: MealRecord = serde_json::from_str(meal_json()).unwrap();
        let bad = MealRecord {
            meal_date: Some("15/03/2024".to_string()),
            ..good.clone()
        };

        let entries = entries_from_records(vec![good.clone(), good.clone()]).unwrap();
        assert_eq!(entries.len(), 2);

        let err = entries_from_records(vec![good.clone(), bad.clone(), good, bad]).unwrap_err();
        let indices: Vec<_> = err.issues().iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_entries_from_records_rejects_oversized_amounts() {
        let huge = MealRecord {
            calories: Some(5e28),
            ..serde_json::from_str(meal_json()).unwrap()
        };

        let err = entries_from_records(vec![huge.clone(), huge]).unwrap_err();
        let fields: Vec<_> = err.issues().iter().map(|i| (i.index, i.field.as_str())).collect();
        assert_eq!(fields, vec![(0, "calories"), (1, "calories")]);

        let too_much = MealRecord {
            quantity: Some(1e12),
            ..serde_json::from_str(meal_json()).unwrap()
        };
        let issues = too_much.into_entry(0).unwrap_err();
        assert_eq!(issues[0].field, "quantity");
    }
}
