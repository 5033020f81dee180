use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which operand of a similarity call violated a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Left,
    Right,
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Left => f.write_str("left"),
            Operand::Right => f.write_str("right"),
        }
    }
}

/// Why a similarity score is unavailable.
///
/// Everything but `EmptyAnswer` comes from [`cosine_similarity`](crate::cosine_similarity);
/// `EmptyAnswer` is reported by callers that skip embedding blank text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreError {
    /// Vectors of different lengths cannot be compared.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    /// Both vectors have zero components.
    #[error("cannot score empty vectors")]
    EmptyVector,
    /// One operand has zero norm, so its direction is undefined.
    #[error("degenerate vector on the {side} side (zero norm)")]
    DegenerateVector { side: Operand },
    /// One operand carries NaN or infinite components.
    #[error("non-finite component on the {side} side")]
    NonFinite { side: Operand },
    /// The text on this side was empty, so it was never embedded.
    #[error("nothing to embed on the {side} side (empty answer)")]
    EmptyAnswer { side: Operand },
}
