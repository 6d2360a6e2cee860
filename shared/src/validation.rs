//! Input validation functions
//!
//! Every numeric form field accepts text matching [`NUMERIC_INPUT_PATTERN`]
//! or nothing at all. Anything else is an [`InputError`]; callers treat that
//! as "keep the previous value".

use crate::errors::InputError;
use std::sync::OnceLock;

/// Digits with at most one decimal point, or empty
pub const NUMERIC_INPUT_PATTERN: &str = r"^[0-9]*\.?[0-9]*$";

/// Upper bound (exclusive) for the inches field
pub const MAX_INCHES: f64 = 12.0;

/// Valid age range in years
pub const MIN_AGE_YEARS: u32 = 1;
pub const MAX_AGE_YEARS: u32 = 120;

fn numeric_regex() -> &'static regex_lite::Regex {
    static REGEX: OnceLock<regex_lite::Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        regex_lite::Regex::new(NUMERIC_INPUT_PATTERN).expect("numeric input pattern is valid")
    })
}

/// Check text against the numeric input pattern
pub fn is_numeric_input(text: &str) -> bool {
    numeric_regex().is_match(text)
}

/// Parse a numeric field.
///
/// `Ok(None)` means the field is cleared: empty text or a lone `"."`.
pub fn parse_numeric_input(text: &str) -> Result<Option<f64>, InputError> {
    if !is_numeric_input(text) {
        return Err(InputError::Malformed(text.to_string()));
    }
    if text.is_empty() || text == "." {
        return Ok(None);
    }
    let value: f64 = text
        .parse()
        .map_err(|_| InputError::Malformed(text.to_string()))?;
    validate_finite(value)?;
    Ok(Some(value))
}

/// Reject NaN, infinities and negative numbers
pub fn validate_finite(value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NonFinite);
    }
    if value < 0.0 {
        return Err(InputError::OutOfRange {
            field: "value",
            value,
            min: 0.0,
            max: f64::INFINITY,
        });
    }
    Ok(())
}

/// Validate the inches component of an imperial height: `[0, 12)`
pub fn validate_inches(inches: f64) -> Result<(), InputError> {
    validate_finite(inches)?;
    if inches >= MAX_INCHES {
        return Err(InputError::OutOfRange {
            field: "heightIn",
            value: inches,
            min: 0.0,
            max: MAX_INCHES,
        });
    }
    Ok(())
}

/// Validate an age in whole years
pub fn validate_age(age: u32) -> Result<(), InputError> {
    if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&age) {
        return Err(InputError::OutOfRange {
            field: "age",
            value: age as f64,
            min: MIN_AGE_YEARS as f64,
            max: MAX_AGE_YEARS as f64,
        });
    }
    Ok(())
}

/// Parse the age field: whole years only, 1..=120
pub fn parse_age_input(text: &str) -> Result<Option<u32>, InputError> {
    match parse_numeric_input(text)? {
        None => Ok(None),
        Some(value) if value.fract() != 0.0 => Err(InputError::Malformed(text.to_string())),
        Some(value) => {
            if value > MAX_AGE_YEARS as f64 {
                return Err(InputError::OutOfRange {
                    field: "age",
                    value,
                    min: MIN_AGE_YEARS as f64,
                    max: MAX_AGE_YEARS as f64,
                });
            }
            let age = value as u32;
            validate_age(age)?;
            Ok(Some(age))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("", true)]
    #[case("70", true)]
    #[case("70.5", true)]
    #[case("12.", true)]
    #[case(".5", true)]
    #[case(".", true)]
    #[case("12.3.4", false)]
    #[case("-5", false)]
    #[case("1e3", false)]
    #[case("abc", false)]
    #[case(" 70", false)]
    #[case("7,5", false)]
    fn test_numeric_pattern(#[case] text: &str, #[case] accepted: bool) {
        assert_eq!(is_numeric_input(text), accepted, "pattern check for {:?}", text);
    }

    #[test]
    fn test_parse_numeric_input() {
        assert_eq!(parse_numeric_input("").unwrap(), None);
        assert_eq!(parse_numeric_input(".").unwrap(), None);
        assert_eq!(parse_numeric_input("70").unwrap(), Some(70.0));
        assert_eq!(parse_numeric_input("12.").unwrap(), Some(12.0));
        assert_eq!(parse_numeric_input(".5").unwrap(), Some(0.5));
        assert!(matches!(
            parse_numeric_input("12.3.4"),
            Err(InputError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_numeric_input_rejects_overflow() {
        let huge = "9".repeat(400);
        assert_eq!(parse_numeric_input(&huge), Err(InputError::NonFinite));
    }

    #[test]
    fn test_validate_inches() {
        assert!(validate_inches(0.0).is_ok());
        assert!(validate_inches(11.9).is_ok());
        assert!(validate_inches(12.0).is_err());
        assert!(validate_inches(f64::NAN).is_err());
        assert!(validate_inches(-1.0).is_err());
    }

    #[test]
    fn test_parse_age_input() {
        assert_eq!(parse_age_input("").unwrap(), None);
        assert_eq!(parse_age_input("30").unwrap(), Some(30));
        assert_eq!(parse_age_input("120").unwrap(), Some(120));
        assert!(parse_age_input("0").is_err());
        assert!(parse_age_input("121").is_err());
        assert!(parse_age_input("30.5").is_err());
        assert!(parse_age_input("thirty").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_plain_decimals_parse(whole in 0u32..1000, tenths in 0u32..10) {
            let text = format!("{}.{}", whole, tenths);
            let parsed = parse_numeric_input(&text).unwrap();
            prop_assert!(parsed.is_some());
        }

        #[test]
        fn prop_two_decimal_points_rejected(a in 0u32..100, b in 0u32..100, c in 0u32..100) {
            let text = format!("{}.{}.{}", a, b, c);
            prop_assert!(parse_numeric_input(&text).is_err());
        }

        #[test]
        fn prop_valid_age_range(age in 1u32..=120) {
            prop_assert_eq!(parse_age_input(&age.to_string()).unwrap(), Some(age));
        }
    }
}
