//! Report export
//!
//! Supports two formats:
//! - CSV: one row per day for spreadsheets
//! - JSON: the full period report with energy values converted

use crate::error::{TrackerError, TrackerResult};
use crate::report::energy;
use calorie_tracker_shared::{DailySummary, EnergyUnit, PeriodReport};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// CSV export row for one day
#[derive(Debug, Clone, Serialize)]
pub struct DailyCsvRow {
    pub date: NaiveDate,
    pub energy_unit: EnergyUnit,
    pub consumed: Decimal,
    pub target: Decimal,
    pub remaining: Decimal,
    pub progress_percent: Decimal,
    pub protein_g: Decimal,
    pub carbs_g: Decimal,
    pub fat_g: Decimal,
    pub fiber_g: Decimal,
    pub entries: usize,
    pub status: String,
}

impl DailyCsvRow {
    pub fn from_summary(summary: &DailySummary, unit: EnergyUnit) -> Self {
        Self {
            date: summary.date,
            energy_unit: unit,
            consumed: energy(summary.total_calories, unit),
            target: energy(Decimal::from(summary.target_calories), unit),
            remaining: energy(summary.remaining_calories, unit),
            progress_percent: summary.progress_percent.round_dp(1).normalize(),
            protein_g: summary.total_protein_g.round_dp(1).normalize(),
            carbs_g: summary.total_carbs_g.round_dp(1).normalize(),
            fat_g: summary.total_fat_g.round_dp(1).normalize(),
            fiber_g: summary.total_fiber_g.round_dp(1).normalize(),
            entries: summary.entry_count,
            status: summary.status().to_string(),
        }
    }
}

/// JSON export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodExport {
    pub export_version: String,
    pub energy_unit: EnergyUnit,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub average_consumed: Decimal,
    pub average_target: Decimal,
    pub average_difference: Decimal,
    pub days_logged: usize,
    pub days_over_target: usize,
    pub days: Vec<DailySummary>,
}

impl PeriodExport {
    pub fn new(report: &PeriodReport, unit: EnergyUnit) -> Self {
        Self {
            export_version: "1.0".to_string(),
            energy_unit: unit,
            start: report.start,
            end: report.end,
            average_consumed: energy(report.average_consumed, unit),
            average_target: energy(report.average_target, unit),
            average_difference: energy(report.average_difference, unit),
            days_logged: report.days_logged,
            days_over_target: report.days_over_target,
            // Per-day summaries stay in kcal, the engine's unit
            days: report.days.clone(),
        }
    }
}

/// Write a report to `writer` in the requested format
pub fn write_report<W: Write>(
    report: &PeriodReport,
    format: ExportFormat,
    unit: EnergyUnit,
    writer: W,
) -> TrackerResult<()> {
    match format {
        ExportFormat::Csv => write_csv(report, unit, writer),
        ExportFormat::Json => {
            serde_json::to_writer_pretty(writer, &PeriodExport::new(report, unit))?;
            Ok(())
        }
    }
}

fn write_csv<W: Write>(report: &PeriodReport, unit: EnergyUnit, writer: W) -> TrackerResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in &report.days {
        wtr.serialize(DailyCsvRow::from_summary(summary, unit))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Convert a report to an in-memory string
pub fn report_to_string(report: &PeriodReport, format: ExportFormat, unit: EnergyUnit) -> TrackerResult<String> {
    let mut buffer = Vec::new();
    write_report(report, format, unit, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| TrackerError::Encoding(e.to_string()))
}
