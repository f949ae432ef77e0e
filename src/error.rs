//! Ошибки ML пайплайна

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Malformed input: field `{field}` {reason}")]
    MalformedInput { field: &'static str, reason: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Model not trained")]
    NotTrained,

    #[error("Training failed: {0}")]
    TrainingFailure(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Training task aborted: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl RiskError {
    /// Ошибка валидации входа (а не отказ модели)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RiskError::MalformedInput { .. } | RiskError::InvalidParameter(_)
        )
    }
}

pub type RiskResult<T> = Result<T, RiskError>;
