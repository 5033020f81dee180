use serde::{Deserialize, Serialize};

use crate::{cosine_similarity, ScoreError};

/// Pooled embedding for exactly one input string.
///
/// Treated as opaque apart from the dot-product and norm operations the scorer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean norm, accumulated in `f64`.
    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|&x| f64::from(x) * f64::from(x))
            .sum::<f64>()
            .sqrt()
    }

    /// Cosine similarity against `other`.
    pub fn similarity(&self, other: &EmbeddingVector) -> Result<f32, ScoreError> {
        cosine_similarity(&self.0, &other.0)
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_norm_and_dim() {
        let v = EmbeddingVector::new(vec![3.0, 4.0]);
        assert_eq!(v.dim(), 2);
        assert!((v.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn vector_serializes_as_plain_array() {
        let v = EmbeddingVector::from(vec![0.5, -0.25]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[0.5,-0.25]");
    }

    #[test]
    fn vector_similarity_delegates_to_scorer() {
        let a = EmbeddingVector::new(vec![1.0, 0.0]);
        let b = EmbeddingVector::new(vec![0.0, 2.0]);
        assert_eq!(a.similarity(&b).unwrap(), 0.0);
    }
}
