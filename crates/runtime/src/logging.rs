use std::{fmt::Arguments, sync::OnceLock};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::PROGRAM_LOG_LEVEL;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Stderr logger used by hosts that embed the collector.
pub struct Logger {
    level: Level,
}

impl Logger {
    pub fn new(level: Level) -> Self {
        Logger { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{}",
                format_line(record.level(), record.target(), record.args())
            );
        }
    }

    fn flush(&self) {}
}

fn format_line(level: Level, target: &str, args: &Arguments<'_>) -> String {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    format!("{timestamp} {level} [{target}] {args}")
}

fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

/// Install the stderr logger at the level named by `GATHER_LOG_LEVEL`.
/// Only the first call installs anything; later calls return `Ok(())`.
pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(get_level_from_env())
}

pub fn init_with_level(level: Level) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // Only the first caller's level is honoured; setting max_level on
    // later calls would disagree with the level stored in LOGGER.
    let first_call = LOGGER.get().is_none();
    let logger = LOGGER.get_or_init(|| Logger::new(level));

    if first_call {
        log::set_logger(logger)?;
        log::set_max_level(logger.level().to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
