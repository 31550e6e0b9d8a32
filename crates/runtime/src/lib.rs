mod config;
pub mod logging;

pub use config::{PROGRAM_LOG_LEVEL, PROGRAM_NAME};

pub use logging::init;
