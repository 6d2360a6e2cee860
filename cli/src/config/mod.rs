//! Configuration management for the calculator CLI
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: HC__)

use anyhow::Result;
use directories::ProjectDirs;
use health_calculators_shared::{BmiFormula, MetricFormula, TdeeFormula};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where calculator input is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per slot; platform data dir when unset
    #[serde(default)]
    pub dir: Option<String>,
    pub bmi_key: String,
    pub tdee_key: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// JSON lines instead of pretty output
    pub json: bool,
    /// Filter used when RUST_LOG is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: "health_calculators_shared=info,health_calculators_cli=info".to_string(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                dir: None,
                bmi_key: BmiFormula::STORAGE_KEY.to_string(),
                tdee_key: TdeeFormula::STORAGE_KEY.to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with HC__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&CliConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., HC__STORAGE__DIR=/tmp/hc sets storage.dir
            .add_source(config::Environment::with_prefix("HC").separator("__"))
            .build()?;

        let config: CliConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations where the calculators could clobber each other
    pub fn validate(&self) -> Result<()> {
        let keys = [&self.storage.bmi_key, &self.storage.tdee_key];
        if keys.iter().any(|key| key.trim().is_empty()) {
            anyhow::bail!("Storage keys must not be empty");
        }
        if self.storage.bmi_key == self.storage.tdee_key {
            anyhow::bail!(
                "BMI and TDEE calculators need distinct storage keys, both are {:?}",
                self.storage.bmi_key
            );
        }
        Ok(())
    }

    /// Directory for the file-backed storage slots
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.dir {
            return Ok(PathBuf::from(dir));
        }
        let dirs = ProjectDirs::from("com", "health-calculators", "health-calc")
            .ok_or_else(|| anyhow::anyhow!("Could not determine app data directory"))?;
        Ok(dirs.data_dir().to_path_buf())
    }
}
