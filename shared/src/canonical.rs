//! Canonicalization layer
//!
//! Derives kilograms and centimeters from whatever the user has entered.
//! Values are recomputed from the current [`RawInputState`] on every read
//! and are never rounded here.

use crate::state::RawInputState;
use crate::units::{height_to_cm, weight_to_kg, UnitSystem};
use serde::{Deserialize, Serialize};

/// Measurements in the canonical unit system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalValues {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

impl CanonicalValues {
    /// Derive canonical values from a raw input snapshot
    pub fn derive<P>(state: &RawInputState<P>) -> Self {
        Self {
            weight_kg: canonical_weight_kg(state),
            height_cm: canonical_height_cm(state),
        }
    }

    /// Both measurements are present
    pub fn is_complete(&self) -> bool {
        self.weight_kg.is_some() && self.height_cm.is_some()
    }
}

/// Weight in kg, absent while the weight field is empty
pub fn canonical_weight_kg<P>(state: &RawInputState<P>) -> Option<f64> {
    state
        .weight
        .map(|weight| weight_to_kg(weight, state.unit_system))
}

/// Height in cm.
///
/// Imperial heights need at least one of feet/inches; the missing one
/// counts as zero. A height that resolves to zero is absent.
pub fn canonical_height_cm<P>(state: &RawInputState<P>) -> Option<f64> {
    let height_cm = match state.unit_system {
        UnitSystem::Metric => state.height_cm,
        UnitSystem::Imperial => {
            if state.height_ft.is_none() && state.height_in.is_none() {
                return None;
            }
            Some(height_to_cm(
                state.height_ft.unwrap_or(0.0),
                state.height_in.unwrap_or(0.0),
            ))
        }
    };
    height_cm.filter(|cm| *cm > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(weight: Option<f64>, height_cm: Option<f64>) -> RawInputState<()> {
        RawInputState {
            weight,
            height_cm,
            ..Default::default()
        }
    }

    fn imperial(weight: Option<f64>, ft: Option<f64>, inches: Option<f64>) -> RawInputState<()> {
        RawInputState {
            weight,
            height_ft: ft,
            height_in: inches,
            unit_system: UnitSystem::Imperial,
            ..Default::default()
        }
    }

    #[test]
    fn test_metric_values_pass_through() {
        let values = CanonicalValues::derive(&metric(Some(70.0), Some(175.0)));
        assert_eq!(values.weight_kg, Some(70.0));
        assert_eq!(values.height_cm, Some(175.0));
        assert!(values.is_complete());
    }

    #[test]
    fn test_imperial_values_are_converted_at_full_precision() {
        let values = CanonicalValues::derive(&imperial(Some(154.3), Some(5.0), Some(8.9)));
        assert_eq!(values.weight_kg, Some(154.3 * 0.453592));
        assert_eq!(values.height_cm, Some((5.0 * 12.0 + 8.9) * 2.54));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let values = CanonicalValues::derive(&metric(None, Some(175.0)));
        assert_eq!(values.weight_kg, None);
        assert!(!values.is_complete());

        let values = CanonicalValues::derive(&imperial(Some(150.0), None, None));
        assert_eq!(values.height_cm, None);
    }

    #[test]
    fn test_partial_imperial_height_uses_zero() {
        let values = CanonicalValues::derive(&imperial(None, Some(6.0), None));
        assert!((values.height_cm.unwrap() - 182.88).abs() < 1e-9);

        let values = CanonicalValues::derive(&imperial(None, None, Some(10.0)));
        assert!((values.height_cm.unwrap() - 25.4).abs() < 1e-9);
    }

    #[test]
    fn test_zero_height_is_absent() {
        let values = CanonicalValues::derive(&metric(Some(70.0), Some(0.0)));
        assert_eq!(values.height_cm, None);
        assert!(!values.is_complete());

        let values = CanonicalValues::derive(&imperial(Some(150.0), Some(0.0), None));
        assert_eq!(values.height_cm, None);

        let values = CanonicalValues::derive(&imperial(Some(150.0), Some(0.0), Some(0.0)));
        assert_eq!(values.height_cm, None);
    }

    #[test]
    fn test_inactive_height_fields_are_ignored() {
        // Stale imperial fields never leak into a metric snapshot
        let mut state = metric(Some(70.0), None);
        state.height_ft = Some(5.0);
        assert_eq!(CanonicalValues::derive(&state).height_cm, None);
    }
}
