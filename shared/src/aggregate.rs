//! Nutrition aggregation
//!
//! Sums pre-scaled logged entries into per-day summaries, per-meal-slot
//! groups and multi-day reports. Every function validates the whole batch
//! first: one malformed entry rejects the call, and the error lists every
//! offending entry.

use crate::errors::{NutritionError, NutritionResult};
use crate::models::{DailySummary, LoggedEntry, MealSlot, MealSlotSummary, Nutrients, PeriodReport};
use crate::validation::validate_target_calories;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Days covered by [`weekly_report`]
pub const WEEK_DAYS: i64 = 7;

/// Longest range a report may span (about ten years)
pub const MAX_PERIOD_DAYS: i64 = 3660;

/// Check every entry in the batch, reporting all problems at once
pub fn validate_entries(entries: &[LoggedEntry]) -> NutritionResult<()> {
    let issues: Vec<_> = entries
        .iter()
        .enumerate()
        .flat_map(|(index, entry)| entry.issues(index))
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(NutritionError::MalformedEntry(issues))
    }
}

/// Sum entries field by field, counting them
fn sum_entries<'a, I>(entries: I) -> NutritionResult<(Nutrients, usize)>
where
    I: IntoIterator<Item = &'a LoggedEntry>,
{
    entries
        .into_iter()
        .try_fold((Nutrients::ZERO, 0usize), |(acc, count), entry| {
            acc.checked_add(&entry.nutrients)
                .map(|sum| (sum, count + 1))
                .ok_or_else(NutritionError::totals_out_of_range)
        })
}

fn check_target(target_calories: i32) -> NutritionResult<()> {
    validate_target_calories(target_calories)
        .map_err(|message| NutritionError::precondition("target_calories", message))
}

/// Sum the entries of one day against the target
///
/// Entries for other dates are ignored. Dates compare exactly; callers
/// normalize time zones before logging.
pub fn aggregate_day(entries: &[LoggedEntry], target_calories: i32, date: NaiveDate) -> NutritionResult<DailySummary> {
    check_target(target_calories)?;
    validate_entries(entries)?;

    let (totals, count) = sum_entries(entries.iter().filter(|entry| entry.date == date))?;
    DailySummary::from_totals(date, totals, target_calories, count)
}

/// Group entries by (date, meal slot) and sum every nutrient
///
/// Output is ordered by date, then breakfast, lunch, dinner, snack. Only
/// groups with at least one entry appear.
pub fn group_by_meal_slot(entries: &[LoggedEntry]) -> NutritionResult<Vec<MealSlotSummary>> {
    validate_entries(entries)?;

    let mut groups: BTreeMap<(NaiveDate, MealSlot), MealSlotSummary> = BTreeMap::new();
    for entry in entries {
        groups
            .entry((entry.date, entry.meal_slot))
            .or_insert_with(|| MealSlotSummary::empty(entry.date, entry.meal_slot))
            .add_entry(entry)?;
    }

    Ok(groups.into_values().collect())
}

/// All four meal slots of one day, empty slots included
pub fn meal_slots_for_day(entries: &[LoggedEntry], date: NaiveDate) -> NutritionResult<Vec<MealSlotSummary>> {
    validate_entries(entries)?;

    let mut slots: Vec<MealSlotSummary> = MealSlot::ALL
        .iter()
        .map(|&slot| MealSlotSummary::empty(date, slot))
        .collect();

    for entry in entries.iter().filter(|entry| entry.date == date) {
        // ALL is in declaration order, so the discriminant is the position
        slots[entry.meal_slot as usize].add_entry(entry)?;
    }

    Ok(slots)
}

/// Calorie and macro totals per logged date
pub fn totals_by_date(entries: &[LoggedEntry]) -> NutritionResult<BTreeMap<NaiveDate, (Nutrients, usize)>> {
    let mut totals: BTreeMap<NaiveDate, (Nutrients, usize)> = BTreeMap::new();
    for entry in entries {
        let (sum, count) = totals.entry(entry.date).or_insert((Nutrients::ZERO, 0));
        *sum = sum
            .checked_add(&entry.nutrients)
            .ok_or_else(NutritionError::totals_out_of_range)?;
        *count += 1;
    }
    Ok(totals)
}

fn check_range(start: NaiveDate, end: NaiveDate) -> NutritionResult<()> {
    if start > end {
        return Err(NutritionError::precondition(
            "date_range",
            format!("start {} is after end {}", start, end),
        ));
    }
    if (end - start).num_days() >= MAX_PERIOD_DAYS {
        return Err(NutritionError::precondition(
            "date_range",
            format!("Range spans more than {} days", MAX_PERIOD_DAYS),
        ));
    }
    Ok(())
}

/// One summary per day of the inclusive range, empty days included
pub fn aggregate_range(
    entries: &[LoggedEntry],
    target_calories: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> NutritionResult<Vec<DailySummary>> {
    check_target(target_calories)?;
    check_range(start, end)?;
    validate_entries(entries)?;

    let totals = totals_by_date(entries)?;

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            let (sum, count) = totals.get(&day).copied().unwrap_or((Nutrients::ZERO, 0));
            DailySummary::from_totals(day, sum, target_calories, count)
        })
        .collect()
}

/// Daily summaries over a range plus averages and counts
pub fn period_report(
    entries: &[LoggedEntry],
    target_calories: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> NutritionResult<PeriodReport> {
    let days = aggregate_range(entries, target_calories, start, end)?;
    build_report(start, end, days)
}

/// First day of the `days`-long period ending at `end`, inclusive
///
/// Fails when `days` is outside `1..=MAX_PERIOD_DAYS` or the start falls
/// before the earliest date `NaiveDate` supports.
pub fn period_start(end: NaiveDate, days: i64) -> NutritionResult<NaiveDate> {
    if !(1..=MAX_PERIOD_DAYS).contains(&days) {
        return Err(NutritionError::precondition(
            "date_range",
            format!("Period must cover 1 to {} days", MAX_PERIOD_DAYS),
        ));
    }
    Duration::try_days(days - 1)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or_else(|| {
            NutritionError::precondition("date_range", format!("A {} day period ending {} is out of range", days, end))
        })
}

/// Report for the seven days ending at `end`, inclusive
pub fn weekly_report(entries: &[LoggedEntry], target_calories: i32, end: NaiveDate) -> NutritionResult<PeriodReport> {
    period_report(entries, target_calories, period_start(end, WEEK_DAYS)?, end)
}

fn checked_total<I: IntoIterator<Item = Decimal>>(values: I) -> NutritionResult<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(NutritionError::totals_out_of_range)
}

fn build_report(start: NaiveDate, end: NaiveDate, days: Vec<DailySummary>) -> NutritionResult<PeriodReport> {
    // aggregate_range always yields at least one day
    let day_count = Decimal::from(days.len().max(1));

    let consumed = checked_total(days.iter().map(|d| d.total_calories))?;
    let target = checked_total(days.iter().map(|d| Decimal::from(d.target_calories)))?;
    let difference = checked_total(days.iter().map(DailySummary::difference))?;

    Ok(PeriodReport {
        start,
        end,
        average_consumed: (consumed / day_count).round_dp(2),
        average_target: (target / day_count).round_dp(2),
        average_difference: (difference / day_count).round_dp(2),
        days_logged: days.iter().filter(|d| d.entry_count > 0).count(),
        days_over_target: days.iter().filter(|d| d.is_over_target()).count(),
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn entry(date: NaiveDate, slot: MealSlot, calories: &str) -> LoggedEntry {
        LoggedEntry {
            food_name: "Test Food".to_string(),
            food_id: None,
            quantity: dec("100"),
            date,
            meal_slot: slot,
            nutrients: Nutrients::new(dec(calories), dec("10"), dec("20"), dec("5"), dec("2")),
        }
    }

    #[test]
    fn test_empty_day() {
        let summary = aggregate_day(&[], 2000, day(1)).unwrap();
        assert_eq!(summary.total_calories, Decimal::ZERO);
        assert_eq!(summary.total_protein_g, Decimal::ZERO);
        assert_eq!(summary.remaining_calories, dec("2000"));
        assert_eq!(summary.progress_percent, Decimal::ZERO);
        assert_eq!(summary.entry_count, 0);
    }

    #[test]
    fn test_over_target_day() {
        let entries = vec![
            entry(day(1), MealSlot::Breakfast, "1000"),
            entry(day(1), MealSlot::Lunch, "1200"),
            entry(day(1), MealSlot::Dinner, "800"),
        ];
        let summary = aggregate_day(&entries, 2000, day(1)).unwrap();
        assert_eq!(summary.total_calories, dec("3000"));
        assert_eq!(summary.remaining_calories, Decimal::ZERO);
        assert_eq!(summary.progress_percent, dec("150"));
        assert_eq!(summary.overage(), dec("1000"));
    }

    #[test]
    fn test_other_dates_ignored() {
        let entries = vec![
            entry(day(1), MealSlot::Breakfast, "400"),
            entry(day(2), MealSlot::Breakfast, "900"),
        ];
        let summary = aggregate_day(&entries, 2000, day(1)).unwrap();
        assert_eq!(summary.total_calories, dec("400"));
        assert_eq!(summary.total_fiber_g, dec("2"));
        assert_eq!(summary.entry_count, 1);
    }

    #[test]
    fn test_non_positive_target_rejected() {
        for target in [0, -1500] {
            let err = aggregate_day(&[], target, day(1)).unwrap_err();
            assert!(matches!(
                err,
                NutritionError::PreconditionViolation { ref field, .. } if field == "target_calories"
            ));
        }
    }

    #[test]
    fn test_malformed_batch_rejected_with_all_issues() {
        let mut bad_quantity = entry(day(1), MealSlot::Lunch, "300");
        bad_quantity.quantity = Decimal::ZERO;
        let mut bad_calories = entry(day(2), MealSlot::Dinner, "-50");
        bad_calories.nutrients.fat_g = dec("-1");

        let entries = vec![entry(day(1), MealSlot::Breakfast, "200"), bad_quantity, bad_calories];
        let err = aggregate_day(&entries, 2000, day(1)).unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 3);
        assert_eq!((issues[0].index, issues[0].field.as_str()), (1, "quantity"));
        assert_eq!((issues[1].index, issues[1].field.as_str()), (2, "calories"));
        assert_eq!((issues[2].index, issues[2].field.as_str()), (2, "fat_g"));

        assert!(group_by_meal_slot(&entries).is_err());
        assert!(validate_entries(&entries[..1]).is_ok());
    }

    #[test]
    fn test_group_by_meal_slot_orders_and_sums() {
        let entries = vec![
            entry(day(2), MealSlot::Snack, "150"),
            entry(day(1), MealSlot::Dinner, "700"),
            entry(day(1), MealSlot::Breakfast, "300"),
            entry(day(1), MealSlot::Dinner, "100"),
        ];
        let groups = group_by_meal_slot(&entries).unwrap();
        let keys: Vec<_> = groups.iter().map(|g| (g.date, g.meal_slot)).collect();
        assert_eq!(
            keys,
            vec![
                (day(1), MealSlot::Breakfast),
                (day(1), MealSlot::Dinner),
                (day(2), MealSlot::Snack),
            ]
        );
        assert_eq!(groups[1].entry_count, 2);
        assert_eq!(groups[1].nutrients.calories, dec("800"));
        assert_eq!(groups[1].nutrients.protein_g, dec("20"));
    }

    #[test]
    fn test_meal_slots_for_day_fills_empty_slots() {
        let entries = vec![
            entry(day(1), MealSlot::Lunch, "500"),
            entry(day(2), MealSlot::Lunch, "999"),
        ];
        let slots = meal_slots_for_day(&entries, day(1)).unwrap();
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].meal_slot, MealSlot::Breakfast);
        assert_eq!(slots[0].entry_count, 0);
        assert_eq!(slots[1].nutrients.calories, dec("500"));
        assert_eq!(slots[3].meal_slot, MealSlot::Snack);
    }

    #[test]
    fn test_aggregate_range_includes_empty_days() {
        let entries = vec![
            entry(day(1), MealSlot::Lunch, "1800"),
            entry(day(3), MealSlot::Lunch, "2500"),
            entry(day(9), MealSlot::Lunch, "4000"),
        ];
        let days = aggregate_range(&entries, 2000, day(1), day(4)).unwrap();
        assert_eq!(days.len(), 4);
        assert_eq!(days[1].total_calories, Decimal::ZERO);
        assert_eq!(days[1].remaining_calories, dec("2000"));
        assert_eq!(days[2].total_calories, dec("2500"));

        assert!(aggregate_range(&entries, 2000, day(4), day(1)).is_err());
    }

    #[test]
    fn test_period_report() {
        let entries = vec![
            entry(day(1), MealSlot::Lunch, "1800"),
            entry(day(3), MealSlot::Lunch, "2500"),
        ];
        let report = period_report(&entries, 2000, day(1), day(4)).unwrap();
        assert_eq!(report.days.len(), 4);
        assert_eq!(report.days_logged, 2);
        assert_eq!(report.days_over_target, 1);
        assert_eq!(report.average_consumed, dec("1075"));
        assert_eq!(report.average_target, dec("2000"));
        assert_eq!(report.average_difference, dec("-925"));
    }

    #[test]
    fn test_weekly_report_covers_seven_days() {
        let entries = vec![
            entry(day(1), MealSlot::Lunch, "1000"),
            entry(day(8), MealSlot::Lunch, "1000"),
        ];
        let report = weekly_report(&entries, 2000, day(8)).unwrap();
        assert_eq!(report.start, day(2));
        assert_eq!(report.end, day(8));
        assert_eq!(report.days.len(), 7);
        assert_eq!(report.days_logged, 1);
    }

    #[test]
    fn test_oversized_entries_rejected_not_panicking() {
        let mut huge = entry(day(1), MealSlot::Lunch, "100");
        huge.nutrients.calories = Decimal::MAX / dec("2") + Decimal::ONE;
        let entries = vec![huge.clone(), huge];

        let err = validate_entries(&entries).unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert_eq!(err.issues()[0].field, "calories");
        assert!(aggregate_day(&entries, 2000, day(1)).is_err());
        assert!(group_by_meal_slot(&entries).is_err());
        assert!(meal_slots_for_day(&entries, day(1)).is_err());
        assert!(aggregate_range(&entries, 1, day(1), day(2)).is_err());
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        // Entries built directly, bypassing validation
        let mut huge = entry(day(1), MealSlot::Lunch, "100");
        huge.nutrients.calories = Decimal::MAX;
        let err = sum_entries([huge.clone(), huge].iter()).unwrap_err();
        assert_eq!(err, NutritionError::totals_out_of_range());
    }

    #[test]
    fn test_period_start() {
        assert_eq!(period_start(day(8), 7).unwrap(), day(2));
        assert_eq!(period_start(day(8), 1).unwrap(), day(8));
        assert_eq!(period_start(day(8), MAX_PERIOD_DAYS).unwrap(), day(8) - Duration::days(MAX_PERIOD_DAYS - 1));
        for days in [0, -3, MAX_PERIOD_DAYS + 1, i64::MAX] {
            let err = period_start(day(8), days).unwrap_err();
            assert!(matches!(err, NutritionError::PreconditionViolation { ref field, .. } if field == "date_range"));
        }
        assert!(period_start(NaiveDate::MIN, 2).is_err());
        assert!(weekly_report(&[], 2000, NaiveDate::MIN).is_err());
    }

    #[test]
    fn test_range_longer_than_limit_rejected() {
        let end = day(8);
        let start = end - Duration::days(MAX_PERIOD_DAYS);
        let err = aggregate_range(&[], 2000, start, end).unwrap_err();
        assert!(matches!(err, NutritionError::PreconditionViolation { ref field, .. } if field == "date_range"));
        assert_eq!(aggregate_range(&[], 2000, start + Duration::days(1), end).unwrap().len() as i64, MAX_PERIOD_DAYS);
    }

    fn slot_strategy() -> impl Strategy<Value = MealSlot> {
        prop::sample::select(MealSlot::ALL.to_vec())
    }

    prop_compose! {
        fn arb_entry()(
            day_offset in 0u32..10,
            slot in slot_strategy(),
            calories in 0i64..200_000,
            protein in 0i64..10_000,
            fat in 0i64..10_000,
        ) -> LoggedEntry {
            LoggedEntry {
                food_name: "Generated".to_string(),
                food_id: None,
                quantity: Decimal::new(100, 0),
                date: day(1 + day_offset),
                meal_slot: slot,
                nutrients: Nutrients::new(
                    Decimal::new(calories, 2),
                    Decimal::new(protein, 2),
                    Decimal::ZERO,
                    Decimal::new(fat, 2),
                    Decimal::ZERO,
                ),
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: per-day totals over all distinct dates sum to the entry total
        #[test]
        fn prop_calories_conserved(entries in prop::collection::vec(arb_entry(), 0..40)) {
            let expected: Decimal = entries.iter().map(|e| e.nutrients.calories).sum();
            let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
            dates.sort();
            dates.dedup();

            let mut total = Decimal::ZERO;
            for date in dates {
                total += aggregate_day(&entries, 2000, date).unwrap().total_calories;
            }
            prop_assert_eq!(total, expected);
        }

        /// Property: aggregating twice gives identical summaries
        #[test]
        fn prop_aggregate_idempotent(
            entries in prop::collection::vec(arb_entry(), 0..40),
            target in 1i32..6000,
        ) {
            let first = aggregate_day(&entries, target, day(3)).unwrap();
            let second = aggregate_day(&entries, target, day(3)).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: remaining is never negative and progress tracks the ratio
        #[test]
        fn prop_remaining_and_progress(
            entries in prop::collection::vec(arb_entry(), 0..40),
            target in 1i32..6000,
        ) {
            let summary = aggregate_day(&entries, target, day(2)).unwrap();
            prop_assert!(summary.remaining_calories >= Decimal::ZERO);
            prop_assert!(summary.remaining_calories <= Decimal::from(target));
            if summary.total_calories >= Decimal::from(target) {
                prop_assert!(summary.progress_percent >= Decimal::ONE_HUNDRED);
            }
        }

        /// Property: slot grouping conserves every macro
        #[test]
        fn prop_grouping_conserves_macros(entries in prop::collection::vec(arb_entry(), 0..40)) {
            let expected = Nutrients::checked_sum(entries.iter().map(|e| &e.nutrients)).unwrap();
            let groups = group_by_meal_slot(&entries).unwrap();
            let grouped = Nutrients::checked_sum(groups.iter().map(|g| &g.nutrients)).unwrap();
            prop_assert_eq!(grouped, expected);

            let counted: usize = groups.iter().map(|g| g.entry_count).sum();
            prop_assert_eq!(counted, entries.len());
        }

        /// Property: a range covering every date accounts for every entry
        #[test]
        fn prop_range_conserves_calories(entries in prop::collection::vec(arb_entry(), 0..40)) {
            let expected: Decimal = entries.iter().map(|e| e.nutrients.calories).sum();
            let days = aggregate_range(&entries, 2000, day(1), day(10)).unwrap();
            prop_assert_eq!(days.len(), 10);
            let total: Decimal = days.iter().map(|d| d.total_calories).sum();
            prop_assert_eq!(total, expected);
        }
    }
}
