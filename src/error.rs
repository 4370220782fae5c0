//! Error types for regsync

use thiserror::Error;

/// Result type alias for regsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for regsync
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors (stream reads, writes, opens)
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed input: bad gzip framing or a corrupt operation record
    #[error("Format error: {message}")]
    Format { message: String },

    /// A delta that does not fit the base it is applied to
    #[error("Delta error: {message}")]
    Delta { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a delta error
    pub fn delta(message: impl Into<String>) -> Self {
        Self::Delta {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error reports corrupt input rather than a storage failure
    pub fn is_corrupt_input(&self) -> bool {
        matches!(self, Error::Format { .. } | Error::Delta { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}
