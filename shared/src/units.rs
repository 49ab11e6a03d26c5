//! Unit conversion for profile measurements and energy display
//!
//! The engine works in kilograms, centimeters and kilocalories. Other
//! units are converted at the record boundary or when rendering output,
//! never inside the calculations.

use crate::errors::NutritionError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453_592_37;
/// Kilograms per stone (14 lb)
pub const KG_PER_STONE: f64 = 14.0 * KG_PER_LB;
/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

/// Weight unit of an incoming profile record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
    Stone,
}

impl WeightUnit {
    fn kg_per_unit(self) -> f64 {
        match self {
            WeightUnit::Kg => 1.0,
            WeightUnit::Lbs => KG_PER_LB,
            WeightUnit::Stone => KG_PER_STONE,
        }
    }

    pub fn to_kg(self, value: f64) -> f64 {
        value * self.kg_per_unit()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
            WeightUnit::Stone => "st",
        }
    }
}

/// Height unit of an incoming profile record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
    Meters,
    Inches,
}

impl HeightUnit {
    fn cm_per_unit(self) -> f64 {
        match self {
            HeightUnit::Cm => 1.0,
            HeightUnit::Meters => 100.0,
            HeightUnit::Inches => CM_PER_INCH,
        }
    }

    pub fn to_cm(self, value: f64) -> f64 {
        value * self.cm_per_unit()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Meters => "m",
            HeightUnit::Inches => "in",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pounds" => Ok(WeightUnit::Lbs),
            "st" | "stone" | "stones" => Ok(WeightUnit::Stone),
            _ => Err(NutritionError::precondition(
                "weight_unit",
                format!("Invalid weight unit '{}'. Must be one of: kg, lbs, st", s),
            )),
        }
    }
}

impl std::str::FromStr for HeightUnit {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeters" => Ok(HeightUnit::Cm),
            "m" | "meters" => Ok(HeightUnit::Meters),
            "in" | "inches" => Ok(HeightUnit::Inches),
            _ => Err(NutritionError::precondition(
                "height_unit",
                format!("Invalid height unit '{}'. Must be one of: cm, m, in", s),
            )),
        }
    }
}

// ============================================================================
// Energy Units
// ============================================================================

/// Kilojoules per kilocalorie (4.184)
pub fn kj_per_kcal() -> Decimal {
    Decimal::new(4184, 3)
}

/// Energy unit used when rendering summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnergyUnit {
    #[default]
    Kcal,
    Kj,
}

impl EnergyUnit {
    /// Convert from this unit to kcal
    pub fn to_kcal(&self, value: Decimal) -> Decimal {
        match self {
            EnergyUnit::Kcal => value,
            EnergyUnit::Kj => value / kj_per_kcal(),
        }
    }

    /// Convert from kcal to this unit, clamping at the decimal range
    pub fn from_kcal(&self, kcal: Decimal) -> Decimal {
        match self {
            EnergyUnit::Kcal => kcal,
            EnergyUnit::Kj => kcal.saturating_mul(kj_per_kcal()),
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            EnergyUnit::Kcal => "kcal",
            EnergyUnit::Kj => "kJ",
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for EnergyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kcal" | "cal" | "calories" => Ok(EnergyUnit::Kcal),
            "kj" | "kilojoules" => Ok(EnergyUnit::Kj),
            _ => Err(format!("Unknown energy unit: {}", s)),
        }
    }
}
