//! Display labels
//!
//! The calculators only ever hand out translation keys. Turning a key into
//! text is the host's business; [`EnglishLabels`] is the built-in table.

/// Maps a translation key to display text
pub trait Translator {
    fn translate(&self, key: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

/// English labels for the fixed keys. Unknown keys come back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLabels;

impl EnglishLabels {
    pub fn label(key: &str) -> Option<&'static str> {
        let label = match key {
            "underweight" => "Underweight",
            "normalWeight" => "Normal weight",
            "overweight" => "Overweight",
            "obesity" => "Obesity",
            "metric" => "Metric",
            "imperial" => "Imperial",
            "kg" => "kg",
            "lb" => "lb",
            "cm" => "cm",
            "ftIn" => "ft/in",
            "male" => "Male",
            "female" => "Female",
            "sedentary" => "Sedentary (little or no exercise)",
            "light" => "Light (exercise 1-3 days/week)",
            "moderate" => "Moderate (exercise 3-5 days/week)",
            "active" => "Active (exercise 6-7 days/week)",
            "extra" => "Extra active (physical job or training twice a day)",
            _ => return None,
        };
        Some(label)
    }
}

impl Translator for EnglishLabels {
    fn translate(&self, key: &str) -> String {
        Self::label(key).unwrap_or(key).to_string()
    }
}
