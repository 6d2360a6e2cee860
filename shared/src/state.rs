//! Input state store
//!
//! Holds the values exactly as the user sees them, in the active unit
//! system, so switching units never forces re-entry.
//!
//! # Invariants
//!
//! - Only the height representation of the active unit system is live;
//!   the other one is cleared on every toggle.
//! - Numeric fields are either `None` or a finite, non-negative number.
//! - A rejected edit leaves the state untouched.

use crate::errors::InputError;
use crate::units::{
    cm_to_feet_inches, display_cm, display_weight, height_to_cm, weight_to_kg, weight_to_lb,
    UnitSystem,
};
use crate::validation::{parse_numeric_input, validate_inches};
use serde_json::{Map, Value};
use std::fmt::Debug;
use tracing::debug;

/// Extra inputs a calculator instance carries next to weight and height.
///
/// Implementations read and write their own fields of the persisted record
/// so each calculator can share the generic store and adapter.
pub trait InstanceParams: Clone + Debug + Default + PartialEq {
    /// Read fields from a persisted record, defaulting each one independently
    fn read_record(record: &Map<String, Value>) -> Self;

    /// Write fields into a persisted record
    fn write_record(&self, record: &mut Map<String, Value>);
}

impl InstanceParams for () {
    fn read_record(_record: &Map<String, Value>) -> Self {}

    fn write_record(&self, _record: &mut Map<String, Value>) {}
}

/// Numeric form fields shared by every calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Weight,
    HeightCm,
    HeightFt,
    HeightIn,
}

impl Field {
    /// Key used in the persisted record
    pub fn key(&self) -> &'static str {
        match self {
            Field::Weight => "weight",
            Field::HeightCm => "heightCm",
            Field::HeightFt => "heightFt",
            Field::HeightIn => "heightIn",
        }
    }

    /// Unit system in which the field is live
    pub fn live_in(&self) -> Option<UnitSystem> {
        match self {
            Field::Weight => None,
            Field::HeightCm => Some(UnitSystem::Metric),
            Field::HeightFt | Field::HeightIn => Some(UnitSystem::Imperial),
        }
    }
}

/// Raw user input of one calculator instance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawInputState<P> {
    /// kg when metric, lb when imperial
    pub weight: Option<f64>,
    pub height_cm: Option<f64>,
    pub height_ft: Option<f64>,
    pub height_in: Option<f64>,
    pub unit_system: UnitSystem,
    pub params: P,
}

impl<P> RawInputState<P> {
    /// Current value of a numeric field
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Weight => self.weight,
            Field::HeightCm => self.height_cm,
            Field::HeightFt => self.height_ft,
            Field::HeightIn => self.height_in,
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<f64> {
        match field {
            Field::Weight => &mut self.weight,
            Field::HeightCm => &mut self.height_cm,
            Field::HeightFt => &mut self.height_ft,
            Field::HeightIn => &mut self.height_in,
        }
    }

    /// Apply user-entered text to a numeric field.
    ///
    /// Returns whether the stored value changed. On error nothing changes.
    pub fn set_field(&mut self, field: Field, text: &str) -> Result<bool, InputError> {
        if let Some(live) = field.live_in() {
            if live != self.unit_system {
                return Err(InputError::InactiveField {
                    field: field.key(),
                    unit_system: self.unit_system,
                });
            }
        }

        let value = parse_numeric_input(text)?;
        if field == Field::HeightIn {
            if let Some(inches) = value {
                validate_inches(inches)?;
            }
        }

        let slot = self.slot(field);
        let changed = *slot != value;
        *slot = value;
        Ok(changed)
    }

    pub fn set_weight(&mut self, text: &str) -> Result<bool, InputError> {
        self.set_field(Field::Weight, text)
    }

    pub fn set_height_cm(&mut self, text: &str) -> Result<bool, InputError> {
        self.set_field(Field::HeightCm, text)
    }

    pub fn set_height_ft(&mut self, text: &str) -> Result<bool, InputError> {
        self.set_field(Field::HeightFt, text)
    }

    pub fn set_height_in(&mut self, text: &str) -> Result<bool, InputError> {
        self.set_field(Field::HeightIn, text)
    }

    /// Switch the unit system, converting the entered values.
    ///
    /// Converted values are rounded for display: weight to one decimal,
    /// centimeters to a whole number, inches to one decimal. Returns
    /// `false` if `target` is already active.
    pub fn set_unit_system(&mut self, target: UnitSystem) -> bool {
        if target == self.unit_system {
            return false;
        }

        match target {
            UnitSystem::Imperial => {
                self.weight = self
                    .weight
                    .map(|kg| display_weight(weight_to_lb(kg, UnitSystem::Metric)));
                match self.height_cm.take() {
                    Some(cm) => {
                        let height = cm_to_feet_inches(cm);
                        self.height_ft = Some(height.feet);
                        self.height_in = Some(height.inches);
                    }
                    None => {
                        self.height_ft = None;
                        self.height_in = None;
                    }
                }
            }
            UnitSystem::Metric => {
                self.weight = self
                    .weight
                    .map(|lb| display_weight(weight_to_kg(lb, UnitSystem::Imperial)));
                let feet = self.height_ft.take().unwrap_or(0.0);
                let inches = self.height_in.take().unwrap_or(0.0);
                self.height_cm = if feet == 0.0 && inches == 0.0 {
                    None
                } else {
                    Some(display_cm(height_to_cm(feet, inches)))
                };
            }
        }

        debug!(
            from = %self.unit_system,
            to = %target,
            weight = ?self.weight,
            height_cm = ?self.height_cm,
            height_ft = ?self.height_ft,
            height_in = ?self.height_in,
            "Converted inputs for unit toggle"
        );
        self.unit_system = target;
        true
    }
}
