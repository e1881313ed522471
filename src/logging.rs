use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use thiserror::Error;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}";
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const KEPT_LOG_FILES: u32 = 5;

/// Sets up a rolling file logger and, optionally, a stdout logger
///
/// # Arguments
///
/// * 'log_path' - directory for log files, including a trailing separator
/// * 'log_level' - root log level
/// * 'log_to_stdout' - whether to also log to stdout
pub fn setup_logger(log_path: &str, log_level: LevelFilter, log_to_stdout: bool) -> Result<Handle, LoggerError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}roof_shading.{{}}.log", log_path), KEPT_LOG_FILES)
        .map_err(|e| LoggerError(format!("error creating log roller: {}", e)))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(MAX_LOG_SIZE)), Box::new(roller));

    let file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(format!("{}roof_shading.log", log_path), Box::new(policy))
        .map_err(|e| LoggerError(format!("error creating log file appender: {}", e)))?;

    let mut builder = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let config = builder
        .build(root.build(log_level))
        .map_err(|e| LoggerError(format!("error building log config: {}", e)))?;

    log4rs::init_config(config).map_err(|e| LoggerError(format!("error initializing logger: {}", e)))
}

/// Error depicting errors that occur while setting up the logger
///
#[derive(Debug, Error)]
#[error("LoggerError: {0}")]
pub struct LoggerError(pub String);
