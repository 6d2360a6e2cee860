//! `health-calc`: interactive BMI and TDEE calculators

use anyhow::Result;
use health_calculators_cli::{config::LoggingConfig, open_session, CliConfig, FileStorage};
use std::io;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = CliConfig::load()?;
    init_tracing(&config.logging);

    let dir = config.storage_dir()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        storage_dir = %dir.display(),
        "Starting health calculators"
    );

    let mut session = open_session(&config, FileStorage::new(dir));
    let stdin = io::stdin();
    let stdout = io::stdout();
    session.run(stdin.lock(), stdout.lock())
}

/// Logs go to stderr so they never mix with the session on stdout
fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.as_str().into());

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if logging.json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(io::stderr))
            .init();
    }
}
