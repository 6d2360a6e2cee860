//! Health Calculators CLI
//!
//! Terminal host for the BMI and TDEE calculators. Input is persisted to
//! one JSON file per calculator, so a session picks up where the last left off.

pub mod config;
pub mod session;
pub mod storage;

use health_calculators_shared::{BmiCalculator, EnglishLabels, TdeeCalculator};

pub use config::CliConfig;
pub use session::{Command, CommandError, Reply, Session};
pub use storage::FileStorage;

/// Mount both calculators on the configured storage slots
pub fn open_session(
    config: &CliConfig,
    storage: FileStorage,
) -> Session<FileStorage, EnglishLabels> {
    let bmi = BmiCalculator::with_key(storage.clone(), config.storage.bmi_key.clone());
    let tdee = TdeeCalculator::with_key(storage, config.storage.tdee_key.clone());
    Session::new(bmi, tdee, EnglishLabels)
}
