#![allow(non_snake_case)]

mod cli;

use std::env;
use std::process::ExitCode;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use scheduleAssistant::config::{AppConfig, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    let (config, config_error) = match env::var("CONFIG_FILE") {
        Ok(path) => match AppConfig::from_file(&path) {
            Ok(config) => (config, None),
            Err(err) => (AppConfig::default(), Some(err)),
        },
        Err(_) => (AppConfig::default(), None),
    };
    let settings = Settings::resolve(&config);
    init_logging(&settings.log_level);
    if let Some(err) = config_error {
        warn!(error = %err, "ignoring config file");
    }

    match cli::cli(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

// RUST_LOG wins over the configured level. Logs go to stderr so listings on
// stdout stay clean.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
