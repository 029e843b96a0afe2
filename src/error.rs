//! Error types for the hybrid training and scanning pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline
///
/// Every stage failure aborts the whole training or inference call, so each
/// variant carries enough context to be reported to the caller as-is.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Dataset error: {0}")]
    DatasetIo(String),

    #[error("Schema error: column '{column}' {reason}")]
    Schema { column: String, reason: String },

    #[error("Model artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Model artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    #[error("Invalid hyperparameters: {0}")]
    Hyperparameter(String),

    #[error("Fit failed during {stage}: {reason}")]
    Fit { stage: String, reason: String },

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PipelineError {
    /// Schema error for a named column
    pub fn schema(column: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::Schema {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Fit error raised by a named stage
    pub fn fit(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::Fit {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Stable discriminator for callers that persist or branch on the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::DatasetIo(_) => "dataset_io",
            PipelineError::Schema { .. } => "schema",
            PipelineError::ArtifactNotFound(_) => "artifact_not_found",
            PipelineError::ArtifactCorrupt(_) => "artifact_corrupt",
            PipelineError::Hyperparameter(_) => "hyperparameter",
            PipelineError::Fit { .. } => "fit",
            PipelineError::UnsupportedInput(_) => "unsupported_input",
            PipelineError::ModelNotFitted => "model_not_fitted",
            PipelineError::IoError(_) => "io",
            PipelineError::SerializationError(_) => "serialization",
        }
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::DatasetIo(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}
