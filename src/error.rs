use embed::EmbedError;
use thiserror::Error;

use crate::Side;

/// Why one side produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceFailure {
    #[error("deadline elapsed before generation finished")]
    TimedOut,
    #[error("generation failed: {0}")]
    Failed(String),
}

impl InferenceFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceFailure::TimedOut => "timed_out",
            InferenceFailure::Failed(_) => "failed",
        }
    }
}

/// Hard failures of a comparison. Degenerate vectors are not among them; they
/// surface in [`ComparisonResult::similarity`](crate::ComparisonResult).
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("invalid prompt template: {0}")]
    InvalidTemplate(String),
    #[error("inference unavailable for input {side}: {reason}")]
    InferenceUnavailable {
        side: Side,
        reason: InferenceFailure,
    },
    #[error("tokenization failed for input {side}: {source}")]
    Tokenizer { side: Side, source: EmbedError },
    #[error("embedding failed for input {side}: {source}")]
    Embedding { side: Side, source: EmbedError },
    #[error("embedding failed for reference '{label}': {source}")]
    ReferenceEmbedding { label: String, source: EmbedError },
}

impl PipelineError {
    /// Side the failure belongs to, when there is one.
    pub fn side(&self) -> Option<Side> {
        match self {
            PipelineError::InferenceUnavailable { side, .. }
            | PipelineError::Tokenizer { side, .. }
            | PipelineError::Embedding { side, .. } => Some(*side),
            PipelineError::InvalidTemplate(_) | PipelineError::ReferenceEmbedding { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidTemplate(_) => "invalid_template",
            PipelineError::InferenceUnavailable { reason, .. } => reason.kind(),
            PipelineError::Tokenizer { .. } => "tokenizer",
            PipelineError::Embedding { .. } | PipelineError::ReferenceEmbedding { .. } => {
                "embedding"
            }
        }
    }
}
