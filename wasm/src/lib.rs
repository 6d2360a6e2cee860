//! Health Calculators WASM Module
//!
//! WebAssembly bindings so a browser form can drive the calculators.
//! Each handle keeps its slot in memory; after every edit the host reads
//! [`saved_state`](BmiCalculatorHandle::saved_state) and writes it to its
//! own storage under [`storage_key`](BmiCalculatorHandle::storage_key).

use health_calculators_shared::{
    health_metrics, ActivityLevel, BmiCalculator, BmiFormula, Gender, MemoryStorage,
    MetricFormula, TdeeCalculator, TdeeFormula, UnitSystem,
};
use wasm_bindgen::prelude::*;

fn seeded_storage(key: &str, saved: Option<String>) -> MemoryStorage {
    let storage = MemoryStorage::new();
    if let Some(saved) = saved {
        storage.insert_raw(key, &saved);
    }
    storage
}

fn parse_unit_system(system: &str) -> Option<UnitSystem> {
    system.parse().ok()
}

/// Calculate BMI (one decimal) from weight (kg) and height (cm)
#[wasm_bindgen]
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    health_metrics::calculate_bmi(weight_kg, height_cm).map(health_metrics::round_bmi)
}

/// Calculate TDEE (Total Daily Energy Expenditure)
/// Uses Mifflin-St Jeor equation; `None` when the height is not positive
#[wasm_bindgen]
pub fn calculate_tdee(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    is_male: bool,
    activity_level: &str,
) -> Option<f64> {
    if height_cm <= 0.0 {
        return None;
    }
    let activity_level: ActivityLevel = activity_level.parse().ok()?;
    let gender = if is_male { Gender::Male } else { Gender::Female };
    let bmr = health_metrics::calculate_bmr_mifflin(weight_kg, height_cm, age_years, gender);
    Some((bmr * activity_level.multiplier()).round())
}

// ============================================================================
// BMI Handle
// ============================================================================

#[wasm_bindgen]
pub struct BmiCalculatorHandle {
    storage: MemoryStorage,
    inner: BmiCalculator<MemoryStorage>,
}

#[wasm_bindgen]
impl BmiCalculatorHandle {
    /// Mount from a previously saved record (or nothing)
    #[wasm_bindgen(constructor)]
    pub fn new(saved: Option<String>) -> Self {
        let storage = seeded_storage(BmiFormula::STORAGE_KEY, saved);
        let inner = BmiCalculator::new(storage.clone());
        Self { storage, inner }
    }

    pub fn storage_key(&self) -> String {
        self.inner.key().to_string()
    }

    /// Persisted record as JSON, if anything has been written yet
    pub fn saved_state(&self) -> Option<String> {
        self.storage.raw(self.inner.key())
    }

    pub fn set_weight(&mut self, text: &str) -> bool {
        self.inner.set_weight(text)
    }

    pub fn set_height_cm(&mut self, text: &str) -> bool {
        self.inner.set_height_cm(text)
    }

    pub fn set_height_ft(&mut self, text: &str) -> bool {
        self.inner.set_height_ft(text)
    }

    pub fn set_height_in(&mut self, text: &str) -> bool {
        self.inner.set_height_in(text)
    }

    /// `"metric"` or `"imperial"`; anything else is ignored
    pub fn set_unit_system(&mut self, system: &str) -> bool {
        match parse_unit_system(system) {
            Some(target) => self.inner.set_unit_system(target),
            None => false,
        }
    }

    pub fn unit_system(&self) -> String {
        self.inner.unit_system().to_string()
    }

    pub fn submit(&mut self) -> Option<f64> {
        self.inner.submit().map(|result| result.bmi)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn bmi(&self) -> Option<f64> {
        self.inner.result().map(|result| result.bmi)
    }

    /// Translation key of the BMI category
    pub fn category_key(&self) -> Option<String> {
        self.inner
            .result()
            .map(|result| result.category.label_key().to_string())
    }

    /// Full result as JSON
    pub fn result_json(&self) -> Option<String> {
        self.inner
            .result()
            .and_then(|result| serde_json::to_string(result).ok())
    }
}

// ============================================================================
// TDEE Handle
// ============================================================================

#[wasm_bindgen]
pub struct TdeeCalculatorHandle {
    storage: MemoryStorage,
    inner: TdeeCalculator<MemoryStorage>,
}

#[wasm_bindgen]
impl TdeeCalculatorHandle {
    /// Mount from a previously saved record (or nothing)
    #[wasm_bindgen(constructor)]
    pub fn new(saved: Option<String>) -> Self {
        let storage = seeded_storage(TdeeFormula::STORAGE_KEY, saved);
        let inner = TdeeCalculator::new(storage.clone());
        Self { storage, inner }
    }

    pub fn storage_key(&self) -> String {
        self.inner.key().to_string()
    }

    /// Persisted record as JSON, if anything has been written yet
    pub fn saved_state(&self) -> Option<String> {
        self.storage.raw(self.inner.key())
    }

    pub fn set_weight(&mut self, text: &str) -> bool {
        self.inner.set_weight(text)
    }

    pub fn set_height_cm(&mut self, text: &str) -> bool {
        self.inner.set_height_cm(text)
    }

    pub fn set_height_ft(&mut self, text: &str) -> bool {
        self.inner.set_height_ft(text)
    }

    pub fn set_height_in(&mut self, text: &str) -> bool {
        self.inner.set_height_in(text)
    }

    pub fn set_age(&mut self, text: &str) -> bool {
        self.inner.set_age(text)
    }

    /// `"male"` or `"female"`; anything else is ignored
    pub fn set_gender(&mut self, gender: &str) -> bool {
        match gender.parse::<Gender>() {
            Ok(gender) => self.inner.set_gender(gender),
            Err(_) => false,
        }
    }

    /// One of `sedentary`, `light`, `moderate`, `active`, `extra`
    pub fn set_activity_level(&mut self, level: &str) -> bool {
        match level.parse::<ActivityLevel>() {
            Ok(level) => self.inner.set_activity_level(level),
            Err(_) => false,
        }
    }

    /// `"metric"` or `"imperial"`; anything else is ignored
    pub fn set_unit_system(&mut self, system: &str) -> bool {
        match parse_unit_system(system) {
            Some(target) => self.inner.set_unit_system(target),
            None => false,
        }
    }

    pub fn unit_system(&self) -> String {
        self.inner.unit_system().to_string()
    }

    pub fn submit(&mut self) -> Option<i64> {
        self.inner.submit().map(|result| result.tdee)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn tdee(&self) -> Option<i64> {
        self.inner.result().map(|result| result.tdee)
    }

    /// Full result as JSON
    pub fn result_json(&self) -> Option<String> {
        self.inner
            .result()
            .and_then(|result| serde_json::to_string(result).ok())
    }
}
