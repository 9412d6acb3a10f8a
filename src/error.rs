//! Error types for the privacy guard.

use thiserror::Error;

/// The seven error kinds the guard can surface.
#[derive(Debug, Error)]
pub enum PrivacyError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("detector timed out: {0}")]
    DetectorTimeout(String),

    #[error("local model transport error: {0}")]
    ModelTransportError(String),

    #[error("failed to parse extraction output: {0}")]
    ExtractionParseError(String),

    #[error("storage write error: {0}")]
    StorageWriteError(String),

    #[error("file read error: {0}")]
    FileReadError(String),

    #[error("policy violation: {0}")]
    PolicyViolation(String),
}

pub type Result<T> = std::result::Result<T, PrivacyError>;
