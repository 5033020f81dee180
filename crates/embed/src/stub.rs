use async_trait::async_trait;
use fxhash::hash64;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use scoring::{l2_normalize_in_place, EmbeddingVector};

use crate::{EmbedError, Embedder};

/// Deterministic embedder used for demos and tests.
///
/// Generates sinusoid values derived from a hash of the input text, so equal
/// strings always map to equal vectors with minimal CPU cost. Fixed vectors can
/// be pinned per input with [`StubEmbedder::with_vector`].
pub struct StubEmbedder {
    dim: usize,
    normalize: bool,
    fixed: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl StubEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            normalize: true,
            fixed: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Always answer `text` with `vector`, as-is.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.fixed.insert(text.into(), vector);
        self
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub(crate) fn hashed_vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        let h = hash64(text.as_bytes());
        for (idx, value) in v.iter_mut().enumerate() {
            *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(vector) = self.fixed.get(text) {
            return Ok(EmbeddingVector::new(vector.clone()));
        }
        if self.dim == 0 {
            return Err(EmbedError::InvalidConfig(
                "stub embedder dimension must be positive".into(),
            ));
        }
        Ok(EmbeddingVector::new(self.hashed_vector(text)))
    }
}
