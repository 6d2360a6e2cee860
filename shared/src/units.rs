//! Unit conversion module
//!
//! Pure, stateless conversions between the metric and imperial
//! representations of body weight and height.
//!
//! # Design Principles
//!
//! 1. **Canonical Units**: Formulas only ever see kilograms and centimeters
//! 2. **Exact Constants**: Each direction has its own fixed factor
//! 3. **Full Precision**: Nothing in here rounds except the `display_*` helpers
//!    used when a value re-enters the input state after a unit toggle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;
/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.20462;
/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Inches per centimeter
pub const INCHES_PER_CM: f64 = 0.393701;
/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

// ============================================================================
// Unit System
// ============================================================================

/// Unit system the user is currently entering values in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Translation key for the unit system name
    pub fn label_key(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Translation key for the weight unit shown in this system
    pub fn weight_unit_key(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "kg",
            UnitSystem::Imperial => "lb",
        }
    }

    /// Translation key for the height unit shown in this system
    pub fn height_unit_key(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "cm",
            UnitSystem::Imperial => "ftIn",
        }
    }

    /// The other unit system
    pub fn toggled(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label_key())
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "si" | "kg" | "cm" => Ok(UnitSystem::Metric),
            "imperial" | "us" | "lb" | "lbs" | "ft" => Ok(UnitSystem::Imperial),
            _ => Err(format!("Unknown unit system: {}", s)),
        }
    }
}

// ============================================================================
// Weight
// ============================================================================

/// Convert a weight entered in `from` to kilograms
pub fn weight_to_kg(value: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => value * KG_PER_LB,
    }
}

/// Convert a weight entered in `from` to pounds
pub fn weight_to_lb(value: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Metric => value * LB_PER_KG,
        UnitSystem::Imperial => value,
    }
}

// ============================================================================
// Height
// ============================================================================

/// Height split into whole feet and remaining inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeetInches {
    pub feet: f64,
    pub inches: f64,
}

impl fmt::Display for FeetInches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{}\"", self.feet, self.inches)
    }
}

/// Convert feet + inches to centimeters: `(feet * 12 + inches) * 2.54`
pub fn height_to_cm(feet: f64, inches: f64) -> f64 {
    (feet * INCHES_PER_FOOT + inches) * CM_PER_INCH
}

/// Convert centimeters to whole feet and inches rounded to one decimal.
///
/// The inches are not re-normalised after rounding, so a remainder such as
/// 11.96 comes back as `12.0` rather than carrying into the feet.
pub fn cm_to_feet_inches(cm: f64) -> FeetInches {
    let total_inches = cm * INCHES_PER_CM;
    let feet = (total_inches / INCHES_PER_FOOT).floor();
    let inches = round_to_tenth(total_inches % INCHES_PER_FOOT);
    FeetInches { feet, inches }
}

// ============================================================================
// Display Rounding
// ============================================================================

/// Round to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Weight as it re-enters the input state after a toggle (1 decimal)
pub fn display_weight(value: f64) -> f64 {
    round_to_tenth(value)
}

/// Centimeters as they re-enter the input state after a toggle (integer)
pub fn display_cm(value: f64) -> f64 {
    value.round()
}
