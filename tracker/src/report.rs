//! Dashboard report
//!
//! Bundles what the dashboard shows for one day: the day's summary, its
//! meal slots, the progress band and the trailing week.

use crate::error::TrackerResult;
use crate::session::SessionContext;
use calorie_tracker_shared::{
    compute_energy_breakdown, DailySummary, EnergyBreakdown, EnergyUnit, MealSlotSummary, PeriodReport,
    ProgressStatus,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub date: NaiveDate,
    pub today: DailySummary,
    pub meal_slots: Vec<MealSlotSummary>,
    pub status: ProgressStatus,
    pub week: PeriodReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<EnergyBreakdown>,
}

impl DashboardReport {
    /// Build the dashboard for `date` from the session's cached summaries
    pub fn build(session: &mut SessionContext, date: NaiveDate) -> TrackerResult<Self> {
        let today = session.daily_summary(date)?;
        let meal_slots = session.meal_slots(date)?;
        let week = session.weekly_report(date)?;
        let energy = session.profile().map(compute_energy_breakdown);

        Ok(Self {
            date,
            status: today.status(),
            today,
            meal_slots,
            week,
            energy,
        })
    }

    /// Plain-text rendering for the terminal
    pub fn render(&self, unit: EnergyUnit) -> String {
        let mut out = String::new();
        let today = &self.today;

        // Writing to a String cannot fail
        let _ = writeln!(out, "Dashboard for {}", self.date);
        let _ = writeln!(
            out,
            "  Consumed: {} / {} {} ({}%, {})",
            energy(today.total_calories, unit),
            energy(Decimal::from(today.target_calories), unit),
            unit,
            today.progress_percent.round_dp(1).normalize(),
            self.status
        );
        let _ = writeln!(out, "  Remaining: {} {}", energy(today.remaining_calories, unit), unit);
        let _ = writeln!(
            out,
            "  Macros: protein {} g, carbs {} g, fat {} g, fiber {} g",
            today.total_protein_g.round_dp(1).normalize(),
            today.total_carbs_g.round_dp(1).normalize(),
            today.total_fat_g.round_dp(1).normalize(),
            today.total_fiber_g.round_dp(1).normalize()
        );

        let _ = writeln!(out, "  Meals:");
        for slot in &self.meal_slots {
            let _ = writeln!(
                out,
                "    {:<10} {:>8} {} ({} entries)",
                slot.meal_slot,
                energy(slot.nutrients.calories, unit),
                unit,
                slot.entry_count
            );
        }

        let _ = writeln!(
            out,
            "  Week {} to {}: avg {} {}, {} of {} days logged, {} over target",
            self.week.start,
            self.week.end,
            energy(self.week.average_consumed, unit),
            unit,
            self.week.days_logged,
            self.week.days.len(),
            self.week.days_over_target
        );

        out
    }
}

/// Energy amount in `unit`, rounded for display
pub fn energy(kcal: Decimal, unit: EnergyUnit) -> Decimal {
    unit.from_kcal(kcal).round_dp(1).normalize()
}
