//! Health Calculators Shared Library
//!
//! The unit-normalization and derived-metric engine behind the BMI and
//! TDEE calculators, shared by the WASM bindings and the CLI host.

pub mod calculator;
pub mod canonical;
pub mod errors;
pub mod health_metrics;
pub mod labels;
pub mod persistence;
pub mod state;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use calculator::{BmiCalculator, Calculator, MetricFormula, TdeeCalculator};
pub use canonical::CanonicalValues;
pub use errors::*;
pub use health_metrics::*;
pub use labels::{EnglishLabels, Translator};
pub use persistence::{KeyValueStorage, MemoryStorage};
pub use state::{Field, InstanceParams, RawInputState};
pub use units::*;
