//! Error types for the research engine.

use thiserror::Error;

/// Errors raised by the research engine.
///
/// All variants are recoverable by the caller; nothing here leaves the
/// engine in a broken state.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Malformed request (negative count, mismatched gender ratio, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A name pool required by the request is empty
    #[error("Name pool exhausted: {0}")]
    PoolExhausted(String),

    /// Segment definition failed validation
    #[error("Invalid segment '{name}': {reason}")]
    InvalidSegment { name: String, reason: String },

    #[error("Segment not found: '{0}'")]
    SegmentNotFound(String),

    #[error("Persona not found: {0}")]
    PersonaNotFound(u64),

    /// Interviews need a product to talk about
    #[error("No product selected")]
    NoProduct,

    #[error("Unsupported export version: {0}")]
    UnsupportedVersion(u8),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ResearchError>;
