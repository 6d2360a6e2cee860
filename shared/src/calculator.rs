//! Reactive calculator instance
//!
//! One generic component wires the input store, canonicalization, a
//! metric formula and the persistence adapter together. Every accepted
//! edit runs the same pipeline synchronously:
//!
//! ```text
//! edit -> RawInputState -> CanonicalValues -> MetricFormula::compute -> save_state
//! ```
//!
//! so after any call returns, the state, the result and the stored record
//! agree. `submit` goes through the exact same `refresh` as edits do.

use crate::canonical::CanonicalValues;
use crate::errors::InputError;
use crate::health_metrics::{ActivityLevel, BmiFormula, Gender, TdeeFormula};
use crate::persistence::{load_state, save_state, KeyValueStorage};
use crate::state::{Field, InstanceParams, RawInputState};
use crate::units::UnitSystem;
use crate::validation::parse_age_input;
use std::fmt::Debug;
use tracing::{debug, trace};

/// A derived health metric computed from canonical values
pub trait MetricFormula {
    /// Inputs beyond weight and height
    type Params: InstanceParams;
    /// Displayable result
    type Output: Clone + Debug + PartialEq;

    /// Short name used in logs
    const NAME: &'static str;
    /// Default storage slot of this calculator
    const STORAGE_KEY: &'static str;

    /// `None` until every required input is present and non-degenerate
    fn compute(canonical: &CanonicalValues, params: &Self::Params) -> Option<Self::Output>;
}

/// A calculator instance bound to one storage slot
pub struct Calculator<F: MetricFormula, S: KeyValueStorage> {
    storage: S,
    key: String,
    state: RawInputState<F::Params>,
    result: Option<F::Output>,
}

pub type BmiCalculator<S> = Calculator<BmiFormula, S>;
pub type TdeeCalculator<S> = Calculator<TdeeFormula, S>;

impl<F: MetricFormula, S: KeyValueStorage> Calculator<F, S> {
    /// Mount a calculator on its default slot, restoring saved input
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, F::STORAGE_KEY)
    }

    /// Mount a calculator on a custom slot
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = load_state(&storage, &key);
        let mut calculator = Self {
            storage,
            key,
            state,
            result: None,
        };
        calculator.refresh();
        calculator
    }

    pub fn state(&self) -> &RawInputState<F::Params> {
        &self.state
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.state.unit_system
    }

    /// Canonical values of the current state
    pub fn canonical(&self) -> CanonicalValues {
        CanonicalValues::derive(&self.state)
    }

    /// Latest result, `None` while input is incomplete
    pub fn result(&self) -> Option<&F::Output> {
        self.result.as_ref()
    }

    pub fn set_field(&mut self, field: Field, text: &str) -> bool {
        self.apply(field.key(), |state| state.set_field(field, text))
    }

    pub fn set_weight(&mut self, text: &str) -> bool {
        self.set_field(Field::Weight, text)
    }

    pub fn set_height_cm(&mut self, text: &str) -> bool {
        self.set_field(Field::HeightCm, text)
    }

    pub fn set_height_ft(&mut self, text: &str) -> bool {
        self.set_field(Field::HeightFt, text)
    }

    pub fn set_height_in(&mut self, text: &str) -> bool {
        self.set_field(Field::HeightIn, text)
    }

    /// Switch unit system, converting entered values
    pub fn set_unit_system(&mut self, target: UnitSystem) -> bool {
        self.apply("unitSystem", |state| Ok(state.set_unit_system(target)))
    }

    /// Switch to the other unit system
    pub fn toggle_unit_system(&mut self) -> bool {
        let target = self.state.unit_system.toggled();
        self.set_unit_system(target)
    }

    /// Recompute on demand; identical to what the last edit produced
    pub fn submit(&mut self) -> Option<&F::Output> {
        self.refresh();
        self.result.as_ref()
    }

    /// Clear every input and persist the empty state
    pub fn reset(&mut self) {
        self.state = RawInputState::default();
        self.result = None;
        self.refresh();
        save_state(&mut self.storage, &self.key, &self.state);
    }

    /// Update instance parameters, returning whether anything changed
    pub(crate) fn apply_params(
        &mut self,
        field: &'static str,
        mutation: impl FnOnce(&mut F::Params) -> Result<bool, InputError>,
    ) -> bool {
        self.apply(field, |state| mutation(&mut state.params))
    }

    fn apply(
        &mut self,
        field: &'static str,
        mutation: impl FnOnce(&mut RawInputState<F::Params>) -> Result<bool, InputError>,
    ) -> bool {
        match mutation(&mut self.state) {
            Ok(changed) => {
                self.result = None;
                self.refresh();
                if changed {
                    save_state(&mut self.storage, &self.key, &self.state);
                }
                changed
            }
            Err(e) => {
                trace!(calculator = F::NAME, field, error = %e, "Rejected input");
                false
            }
        }
    }

    fn refresh(&mut self) {
        let canonical = self.canonical();
        self.result = F::compute(&canonical, &self.state.params);
        debug!(
            calculator = F::NAME,
            weight_kg = ?canonical.weight_kg,
            height_cm = ?canonical.height_cm,
            result = ?self.result,
            "Recomputed"
        );
    }
}

impl<S: KeyValueStorage> Calculator<TdeeFormula, S> {
    /// Set age from text; whole years 1..=120, empty clears it
    pub fn set_age(&mut self, text: &str) -> bool {
        self.apply_params("age", |params| {
            let age = parse_age_input(text)?;
            let changed = params.age != age;
            params.age = age;
            Ok(changed)
        })
    }

    pub fn set_gender(&mut self, gender: Gender) -> bool {
        self.apply_params("gender", |params| {
            let changed = params.gender != gender;
            params.gender = gender;
            Ok(changed)
        })
    }

    pub fn set_activity_level(&mut self, activity_level: ActivityLevel) -> bool {
        self.apply_params("activityLevel", |params| {
            let changed = params.activity_level != activity_level;
            params.activity_level = activity_level;
            Ok(changed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health_metrics::BmiCategory;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_bmi_recomputes_on_each_edit() {
        let mut calc = BmiCalculator::new(MemoryStorage::new());
        assert!(calc.result().is_none());

        assert!(calc.set_weight("70"));
        assert!(calc.result().is_none());

        assert!(calc.set_height_cm("175"));
        let result = calc.result().unwrap();
        assert_eq!(result.bmi, 22.9);
        assert_eq!(result.category, BmiCategory::Normal);

        assert!(calc.set_height_cm(""));
        assert!(calc.result().is_none());
    }

    #[test]
    fn test_rejected_edit_changes_nothing() {
        let storage = MemoryStorage::new();
        let mut calc = BmiCalculator::new(storage.clone());
        calc.set_weight("70");
        calc.set_height_cm("175");
        let saved = storage.raw(BmiFormula::STORAGE_KEY);

        assert!(!calc.set_weight("12.3.4"));
        assert_eq!(calc.state().weight, Some(70.0));
        assert_eq!(calc.result().unwrap().bmi, 22.9);
        assert_eq!(storage.raw(BmiFormula::STORAGE_KEY), saved);
    }

    #[test]
    fn test_submit_matches_reactive_result() {
        let mut calc = BmiCalculator::new(MemoryStorage::new());
        calc.set_weight("82.4");
        calc.set_height_cm("181");
        let reactive = calc.result().cloned();
        assert_eq!(calc.submit().cloned(), reactive);
    }

    #[test]
    fn test_zero_height_yields_no_result() {
        let mut calc = BmiCalculator::new(MemoryStorage::new());
        calc.set_weight("70");
        calc.set_height_cm("0");
        assert!(calc.result().is_none());
        assert!(calc.submit().is_none());
    }

    #[test]
    fn test_zero_height_yields_no_tdee() {
        let mut calc = TdeeCalculator::new(MemoryStorage::new());
        calc.set_age("30");
        calc.set_weight("70");
        calc.set_height_cm("0");
        assert!(calc.result().is_none());
        assert!(calc.submit().is_none());

        calc.set_unit_system(UnitSystem::Imperial);
        calc.set_weight("154");
        calc.set_height_ft("0");
        assert_eq!(calc.canonical().height_cm, None);
        assert!(calc.result().is_none());

        calc.set_height_in("0");
        assert!(calc.result().is_none());

        calc.set_height_ft("5");
        assert!(calc.result().is_some());
    }

    #[test]
    fn test_toggle_keeps_result() {
        let mut calc = BmiCalculator::new(MemoryStorage::new());
        calc.set_weight("70");
        calc.set_height_cm("175");
        assert!(calc.toggle_unit_system());
        assert_eq!(calc.unit_system(), UnitSystem::Imperial);
        // 154.3 lb, 5'8.9" -> 69.989 kg, 175.006 cm
        assert_eq!(calc.result().unwrap().bmi, 22.9);
    }

    #[test]
    fn test_tdee_params_drive_recompute() {
        let mut calc = TdeeCalculator::new(MemoryStorage::new());
        calc.set_weight("80");
        calc.set_height_cm("180");
        assert!(calc.result().is_none());

        assert!(calc.set_age("30"));
        assert!(calc.set_activity_level(ActivityLevel::Moderate));
        assert_eq!(calc.result().unwrap().tdee, 2759);

        assert!(calc.set_gender(Gender::Female));
        // 1780 - 166 = 1614 * 1.55 = 2501.7
        assert_eq!(calc.result().unwrap().tdee, 2502);

        assert!(!calc.set_gender(Gender::Female));
        assert!(!calc.set_age("30.5"));
        assert_eq!(calc.state().params.age, Some(30));
    }

    #[test]
    fn test_reset_clears_and_persists() {
        let storage = MemoryStorage::new();
        let mut calc = TdeeCalculator::new(storage.clone());
        calc.set_weight("80");
        calc.set_age("30");
        calc.reset();
        assert_eq!(calc.state(), &RawInputState::default());

        let remounted = TdeeCalculator::new(storage);
        assert_eq!(remounted.state(), &RawInputState::default());
    }
}
