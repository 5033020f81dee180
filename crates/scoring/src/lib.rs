//! Similarity scoring for pooled embeddings.
//!
//! A single pure function does the work: [`cosine_similarity`] returns
//! `dot(a, b) / (|a| * |b|)` for two equal-length vectors. Everything that would
//! quietly turn into `NaN` (mismatched lengths, zero-norm operands, non-finite
//! components) comes back as a [`ScoreError`] instead, so a report never shows a
//! made-up number.
//!
//! ```
//! use scoring::{cosine_similarity, ScoreError};
//!
//! let score = cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]).unwrap();
//! assert!((score - 1.0).abs() < 1e-6);
//!
//! assert!(matches!(
//!     cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]),
//!     Err(ScoreError::DegenerateVector { .. })
//! ));
//! ```

mod error;
mod normalize;
mod vector;

pub use crate::error::{Operand, ScoreError};
pub use crate::normalize::l2_normalize_in_place;
pub use crate::vector::EmbeddingVector;

/// Cosine similarity of two equal-length vectors.
///
/// Accumulates in `f64` and clamps the result to `[-1, 1]` so rounding never
/// pushes a self-similarity above one.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, ScoreError> {
    if a.len() != b.len() {
        return Err(ScoreError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(ScoreError::EmptyVector);
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if !norm_a.is_finite() {
        return Err(ScoreError::NonFinite {
            side: Operand::Left,
        });
    }
    if !norm_b.is_finite() {
        return Err(ScoreError::NonFinite {
            side: Operand::Right,
        });
    }
    if norm_a == 0.0 {
        return Err(ScoreError::DegenerateVector {
            side: Operand::Left,
        });
    }
    if norm_b == 0.0 {
        return Err(ScoreError::DegenerateVector {
            side: Operand::Right,
        });
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    Ok(score.clamp(-1.0, 1.0) as f32)
}
