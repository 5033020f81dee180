//! Tokenization and pooled-embedding collaborators.
//!
//! The comparison pipeline talks to three narrow interfaces defined here:
//!
//! - [`Tokenizer`] turns a string into opaque token ids,
//! - [`TokenDecoder`] renders those ids back to display text one at a time,
//!   holding back bytes of characters that are not complete yet,
//! - [`Embedder`] maps a string to exactly one mean-pooled [`EmbeddingVector`].
//!
//! Adapters:
//!
//! - [`ByteTokenizer`]: model-free UTF-8 byte tokens,
//! - [`HfTokenizer`]: Hugging Face `tokenizer.json`,
//! - [`StubEmbedder`]: deterministic hash-seeded vectors for tests and demos,
//! - [`HttpEmbedder`]: Hugging Face / OpenAI-compatible HTTP embedding APIs with
//!   retry and backoff.

mod api;
mod byte_tokenizer;
mod error;
mod hf_tokenizer;
mod pool;
pub mod retry;
mod stub;

use async_trait::async_trait;

pub use scoring::EmbeddingVector;

pub use crate::api::{ApiProvider, HttpEmbedder, HttpEmbedderConfig};
pub use crate::byte_tokenizer::{ByteDecoder, ByteTokenizer};
pub use crate::error::EmbedError;
pub use crate::hf_tokenizer::HfTokenizer;
pub use crate::pool::mean_pool;
pub use crate::retry::RetryConfig;
pub use crate::stub::StubEmbedder;

/// Opaque token identifier.
pub type TokenId = u32;

/// Deterministic string-to-token mapping.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, EmbedError>;

    /// Fresh decoder for one rendering pass.
    fn decoder(&self) -> Box<dyn TokenDecoder + '_>;
}

/// Stateful token-to-text renderer scoped to one pass.
///
/// `read` returns only text that is complete so far; call `flush` after the
/// last token to collect anything still held back.
pub trait TokenDecoder {
    fn push(&mut self, token: TokenId);
    fn read(&mut self) -> Result<String, EmbedError>;
    fn flush(&mut self) -> Result<String, EmbedError>;
}

/// Produces one pooled vector per input string.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbedError>;
}
