//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`PipelineError`] as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
///
/// Normalization and encoding never fail. Everything else surfaces here unchanged,
/// so callers decide how to present it.
///
/// # Example
///
/// ```rust
/// use review_sentiment::error::PipelineError;
///
/// fn describe(e: &PipelineError) -> &'static str {
///     match e {
///         PipelineError::EmptyBatch => "upload at least one review",
///         PipelineError::MissingColumn(_) => "CSV must have a 'Comments' column",
///         PipelineError::Csv(_) => "could not read the uploaded file",
///         PipelineError::Inference(_) | PipelineError::Device(_) => "model unavailable",
///         _ => "internal error",
///     }
/// }
///
/// assert_eq!(describe(&PipelineError::EmptyBatch), "upload at least one review");
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// A summary was requested for zero reviews.
    #[error("cannot summarize an empty batch of reviews")]
    EmptyBatch,

    /// Model forward pass failed or returned malformed output.
    #[error("{0}")]
    Inference(String),

    /// Vocabulary artifact is malformed or uses an unsupported tokenizer contract.
    #[error("{0}")]
    Vocabulary(String),

    /// Network or download failure.
    #[error("{0}")]
    Download(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Tabular input lacks the expected column.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// Tabular input could not be parsed.
    #[error("{0}")]
    Csv(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Inference(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(value: csv::Error) -> Self {
        PipelineError::Csv(format!("Failed to read CSV: {}", value))
    }
}
