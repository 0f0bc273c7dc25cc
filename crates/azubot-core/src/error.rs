use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode config file {path}: {source}")]
    DecodeFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for config key {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Malformed numeric text. Callers catch this locally and leave the field at
/// its zero default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no digits in count text {0:?}")]
    NoDigits(String),

    #[error("count text {0:?} overflows u64")]
    Overflow(String),
}
