use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AbSearchError {
    #[error("invalid application code: {0}")]
    InvalidApplicationCode(String),

    #[error("invalid application pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("unknown provider: {0}")]
    #[diagnostic(help("supported providers are: abcam, mock"))]
    UnknownProvider(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("{provider} request failed: {message}")]
    ProviderHttp { provider: String, message: String },

    #[error("{provider} returned status {status}: {message}")]
    ProviderStatus {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to serialize output: {0}")]
    Serialize(String),

    #[error("failed to write CSV output: {0}")]
    Csv(String),
}
