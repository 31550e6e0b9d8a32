use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by an `add` call.
#[derive(Debug, Error)]
pub enum GatherError {
    /// The path specification was empty.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Neither an existing file, an existing directory, nor a wildcard
    /// over an existing directory.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// A wildcard fragment that could not be compiled.
    #[error("Invalid wildcard pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// I/O failure on an explicitly named path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GatherError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with path context; a missing path becomes `NotFound`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, GatherError>;
