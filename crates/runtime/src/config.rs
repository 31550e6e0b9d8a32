pub const PROGRAM_NAME: &str = "gather";
/// Env var holding the log level, parsed as a `log::LevelFilter` name.
pub const PROGRAM_LOG_LEVEL: &str = "GATHER_LOG_LEVEL";
