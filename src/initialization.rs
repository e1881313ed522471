use std::env;
use log::info;
use thiserror::Error;
use roof_shading::config::{load_config, Config, LoadConfigurationError};
use crate::logging::{setup_logger, LoggerError};

/// Initializes and returns configuration
///
/// The configuration file is given on the command line as `--config=<path>`.
pub fn init() -> Result<Config, InitializationError> {
    let args: Vec<String> = env::args().collect();
    let config_path = config_path(&args)?;

    // Load configuration
    let config = load_config(config_path)?;

    // Setup logging
    let _ = setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;

    // Print version
    info!("starting roof shading analysis version: {}", env!("CARGO_PKG_VERSION"));

    Ok(config)
}

/// Extracts the config file path from the program arguments
///
/// # Arguments
///
/// * 'args' - program arguments
fn config_path(args: &[String]) -> Result<&str, InitializationError> {
    args.iter()
        .find_map(|a| a.strip_prefix("--config="))
        .filter(|p| !p.is_empty())
        .ok_or(InitializationError::ArgumentError("missing --config=<path> argument".to_string()))
}

/// Error depicting errors that occur while initializing the analysis
///
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("ArgumentError: {0}")]
    ArgumentError(String),
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] LoadConfigurationError),
    #[error("SetupLoggerError: {0}")]
    SetupLoggerError(#[from] LoggerError),
}
