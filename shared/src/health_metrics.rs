//! Health metrics calculations module
//!
//! The metric engine: pure formulas mapping canonical values (kg, cm) plus
//! instance parameters to a displayable result, and the two formula
//! adapters ([`BmiFormula`], [`TdeeFormula`]) that plug them into the
//! generic [`Calculator`](crate::calculator::Calculator).
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Absent, Not Failed**: Missing or degenerate input yields `None`
//! 3. **Canonical Only**: Formulas never see the user's display units

use crate::calculator::MetricFormula;
use crate::canonical::CanonicalValues;
use crate::persistence::{read_age, read_enum, write_age};
use crate::state::InstanceParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Profile Parameters
// ============================================================================

/// Gender used by the Mifflin-St Jeor equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// Translation key
    pub fn label_key(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Very hard exercise, physical job
    Extra,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::Extra,
    ];

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::Extra => 1.9,
        }
    }

    /// Translation key
    pub fn label_key(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::Extra => "extra",
        }
    }
}

impl std::str::FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.label_key() == normalized)
            .ok_or_else(|| format!("Unknown activity level: {}", s))
    }
}

// ============================================================================
// BMI Calculations
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Get the BMI range for this category (inclusive lower bound)
    pub fn range(&self) -> (f64, f64) {
        match self {
            BmiCategory::Underweight => (0.0, 18.5),
            BmiCategory::Normal => (18.5, 25.0),
            BmiCategory::Overweight => (25.0, 30.0),
            BmiCategory::Obese => (30.0, f64::INFINITY),
        }
    }

    /// Translation key passed to the label collaborator
    pub fn label_key(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normalWeight",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obesity",
        }
    }
}

/// BMI calculation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    /// BMI rounded to one decimal
    pub bmi: f64,
    pub category: BmiCategory,
    /// Weight range in kg giving a normal BMI at this height
    pub healthy_weight_range_kg: (f64, f64),
}

/// Unrounded BMI; `None` when the height is not positive.
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(weight_kg / (height_m * height_m))
}

/// Round a BMI to one decimal place
pub fn round_bmi(bmi: f64) -> f64 {
    (bmi * 10.0).round() / 10.0
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Calculate healthy weight range for a given height
///
/// Based on BMI 18.5-25 (normal range)
pub fn healthy_weight_range_kg(height_cm: f64) -> (f64, f64) {
    let height_m = height_cm / 100.0;
    let height_m_sq = height_m * height_m;
    (18.5 * height_m_sq, 25.0 * height_m_sq)
}

/// Calculate the complete BMI result from canonical values
pub fn compute_bmi(canonical: &CanonicalValues) -> Option<BmiResult> {
    let weight_kg = canonical.weight_kg?;
    let height_cm = canonical.height_cm?;
    let bmi = round_bmi(calculate_bmi(weight_kg, height_cm)?);

    Some(BmiResult {
        bmi,
        category: classify_bmi(bmi),
        healthy_weight_range_kg: healthy_weight_range_kg(height_cm),
    })
}

// ============================================================================
// BMR and TDEE Calculations
// ============================================================================

/// Never suggest a deficit below this intake
pub const MIN_SAFE_CALORIES: i64 = 1200;

/// Daily surplus/deficit used for the gain and loss targets
pub const CALORIE_ADJUSTMENT: i64 = 500;

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// TDEE calculation result with breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdeeResult {
    /// Total Daily Energy Expenditure, kcal/day
    pub tdee: i64,
    /// Basal Metabolic Rate, kcal/day
    pub bmr: i64,
    pub activity_multiplier: f64,
    /// Calories for weight loss (500 deficit, never below 1200)
    pub calories_for_loss: i64,
    /// Calories for weight gain (500 surplus)
    pub calories_for_gain: i64,
}

/// Extra inputs of the TDEE calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TdeeParams {
    pub age: Option<u32>,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl InstanceParams for TdeeParams {
    fn read_record(record: &Map<String, Value>) -> Self {
        Self {
            age: read_age(record, "age"),
            gender: read_enum(record, "gender"),
            activity_level: read_enum(record, "activityLevel"),
        }
    }

    fn write_record(&self, record: &mut Map<String, Value>) {
        write_age(record, "age", self.age);
        record.insert("gender".to_string(), Value::from(self.gender.label_key()));
        record.insert(
            "activityLevel".to_string(),
            Value::from(self.activity_level.label_key()),
        );
    }
}

/// Calculate the complete TDEE result from canonical values and profile
pub fn compute_tdee(canonical: &CanonicalValues, params: &TdeeParams) -> Option<TdeeResult> {
    let age = params.age?;
    let weight_kg = canonical.weight_kg?;
    let height_cm = canonical.height_cm?;

    let bmr = calculate_bmr_mifflin(weight_kg, height_cm, age, params.gender);
    let multiplier = params.activity_level.multiplier();
    let tdee = (bmr * multiplier).round() as i64;

    Some(TdeeResult {
        tdee,
        bmr: bmr.round() as i64,
        activity_multiplier: multiplier,
        calories_for_loss: (tdee - CALORIE_ADJUSTMENT).max(MIN_SAFE_CALORIES),
        calories_for_gain: tdee + CALORIE_ADJUSTMENT,
    })
}

// ============================================================================
// Formula Adapters
// ============================================================================

/// Body-mass index calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct BmiFormula;

impl MetricFormula for BmiFormula {
    type Params = ();
    type Output = BmiResult;

    const NAME: &'static str = "bmi";
    const STORAGE_KEY: &'static str = "bmiCalculatorState";

    fn compute(canonical: &CanonicalValues, _params: &()) -> Option<BmiResult> {
        compute_bmi(canonical)
    }
}

/// Total daily energy expenditure calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct TdeeFormula;

impl MetricFormula for TdeeFormula {
    type Params = TdeeParams;
    type Output = TdeeResult;

    const NAME: &'static str = "tdee";
    const STORAGE_KEY: &'static str = "tdeeCalculatorState";

    fn compute(canonical: &CanonicalValues, params: &TdeeParams) -> Option<TdeeResult> {
        compute_tdee(canonical, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn canonical(weight_kg: Option<f64>, height_cm: Option<f64>) -> CanonicalValues {
        CanonicalValues { weight_kg, height_cm }
    }

    // =========================================================================
    // BMI Tests
    // =========================================================================

    #[test]
    fn test_bmi_example() {
        // 70kg, 175cm -> 70 / 3.0625 = 22.857 -> 22.9
        let result = compute_bmi(&canonical(Some(70.0), Some(175.0))).unwrap();
        assert_eq!(result.bmi, 22.9);
        assert_eq!(result.category, BmiCategory::Normal);
        assert_eq!(result.category.label_key(), "normalWeight");
    }

    #[rstest]
    #[case(18.4, BmiCategory::Underweight)]
    #[case(18.5, BmiCategory::Normal)]
    #[case(24.9, BmiCategory::Normal)]
    #[case(25.0, BmiCategory::Overweight)]
    #[case(29.9, BmiCategory::Overweight)]
    #[case(30.0, BmiCategory::Obese)]
    #[case(45.0, BmiCategory::Obese)]
    fn test_bmi_category_boundaries(#[case] bmi: f64, #[case] expected: BmiCategory) {
        assert_eq!(classify_bmi(bmi), expected);
    }

    #[test]
    fn test_bmi_rounding_decides_category() {
        // 18.46 rounds to 18.5 and is classified on the rounded value
        let result = compute_bmi(&canonical(Some(18.46), Some(100.0))).unwrap();
        assert_eq!(result.bmi, 18.5);
        assert_eq!(result.category, BmiCategory::Normal);
    }

    #[test]
    fn test_bmi_absent_inputs() {
        assert!(compute_bmi(&canonical(Some(70.0), None)).is_none());
        assert!(compute_bmi(&canonical(None, Some(175.0))).is_none());
        assert!(compute_bmi(&canonical(None, None)).is_none());
    }

    #[test]
    fn test_bmi_zero_height_guard() {
        assert!(calculate_bmi(70.0, 0.0).is_none());
        assert!(compute_bmi(&canonical(Some(70.0), Some(0.0))).is_none());
    }

    #[test]
    fn test_healthy_weight_range() {
        // For 175cm, healthy range should be ~56.7-76.6 kg
        let (min, max) = healthy_weight_range_kg(175.0);
        assert!((min - 56.7).abs() < 0.5);
        assert!((max - 76.6).abs() < 0.5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: BMI is one-decimal and matches the closed-form formula
        #[test]
        fn prop_bmi_matches_formula(weight in 20.0f64..300.0, height in 100.0f64..250.0) {
            let result = compute_bmi(&canonical(Some(weight), Some(height))).unwrap();
            let height_m = height / 100.0;
            let expected = (weight / (height_m * height_m) * 10.0).round() / 10.0;
            prop_assert_eq!(result.bmi, expected);
            prop_assert_eq!(result.category, classify_bmi(expected));
        }

        /// Property: Heavier weight = higher or equal BMI (same height)
        #[test]
        fn prop_bmi_increases_with_weight(
            weight1 in 50.0f64..100.0,
            weight2 in 100.0f64..150.0,
            height in 150.0f64..200.0
        ) {
            let bmi1 = calculate_bmi(weight1, height).unwrap();
            let bmi2 = calculate_bmi(weight2, height).unwrap();
            prop_assert!(bmi2 > bmi1);
        }

        /// Property: Healthy weight range contains weights that produce normal BMI
        #[test]
        fn prop_healthy_range_produces_normal_bmi(height in 150.0f64..200.0) {
            let (min, max) = healthy_weight_range_kg(height);
            let bmi = calculate_bmi((min + max) / 2.0, height).unwrap();
            prop_assert_eq!(classify_bmi(bmi), BmiCategory::Normal);
        }
    }

    // =========================================================================
    // BMR/TDEE Tests
    // =========================================================================

    #[test]
    fn test_bmr_mifflin() {
        // 30yo male, 80kg, 180cm -> 800 + 1125 - 150 + 5 = 1780
        assert_eq!(calculate_bmr_mifflin(80.0, 180.0, 30, Gender::Male), 1780.0);
        // 30yo female, 60kg, 165cm -> 600 + 1031.25 - 150 - 161 = 1320.25
        assert_eq!(calculate_bmr_mifflin(60.0, 165.0, 30, Gender::Female), 1320.25);
    }

    #[test]
    fn test_tdee_example() {
        let params = TdeeParams {
            age: Some(30),
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
        };
        let result = compute_tdee(&canonical(Some(80.0), Some(180.0)), &params).unwrap();
        assert_eq!(result.bmr, 1780);
        assert_eq!(result.tdee, 2759);
        assert_eq!(result.activity_multiplier, 1.55);
        assert_eq!(result.calories_for_loss, 2259);
        assert_eq!(result.calories_for_gain, 3259);
    }

    #[test]
    fn test_tdee_loss_target_floor() {
        let params = TdeeParams {
            age: Some(80),
            gender: Gender::Female,
            activity_level: ActivityLevel::Sedentary,
        };
        let result = compute_tdee(&canonical(Some(40.0), Some(145.0)), &params).unwrap();
        assert_eq!(result.calories_for_loss, MIN_SAFE_CALORIES);
    }

    #[test]
    fn test_tdee_requires_age_weight_height() {
        let params = TdeeParams::default();
        assert!(compute_tdee(&canonical(Some(80.0), Some(180.0)), &params).is_none());

        let params = TdeeParams { age: Some(30), ..Default::default() };
        assert!(compute_tdee(&canonical(None, Some(180.0)), &params).is_none());
        assert!(compute_tdee(&canonical(Some(80.0), None), &params).is_none());
    }

    #[rstest]
    #[case(ActivityLevel::Sedentary, 1.2)]
    #[case(ActivityLevel::Light, 1.375)]
    #[case(ActivityLevel::Moderate, 1.55)]
    #[case(ActivityLevel::Active, 1.725)]
    #[case(ActivityLevel::Extra, 1.9)]
    fn test_activity_multipliers(#[case] level: ActivityLevel, #[case] factor: f64) {
        assert_eq!(level.multiplier(), factor);
        assert_eq!(level.label_key().parse::<ActivityLevel>().unwrap(), level);
    }

    #[test]
    fn test_enum_defaults_are_first_values() {
        assert_eq!(Gender::default(), Gender::Male);
        assert_eq!(ActivityLevel::default(), ActivityLevel::Sedentary);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: Male BMR > Female BMR (same stats)
        #[test]
        fn prop_male_bmr_higher(
            weight in 50.0f64..100.0,
            height in 160.0f64..190.0,
            age in 20u32..60
        ) {
            let male = calculate_bmr_mifflin(weight, height, age, Gender::Male);
            let female = calculate_bmr_mifflin(weight, height, age, Gender::Female);
            prop_assert!(male > female);
        }

        /// Property: More active = higher TDEE
        #[test]
        fn prop_activity_orders_tdee(
            weight in 50.0f64..100.0,
            height in 160.0f64..190.0,
            age in 20u32..60
        ) {
            let values = canonical(Some(weight), Some(height));
            let tdees: Vec<i64> = ActivityLevel::ALL
                .iter()
                .map(|&activity_level| {
                    let params = TdeeParams { age: Some(age), gender: Gender::Male, activity_level };
                    compute_tdee(&values, &params).unwrap().tdee
                })
                .collect();
            prop_assert!(tdees.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
