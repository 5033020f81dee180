//! Compare what a model answers for two inputs.
//!
//! [`ComparisonPipeline::compare`] renders each input into a prompt, generates
//! an answer under a deadline, cleans it, then tokenizes, embeds and scores
//! both answers:
//!
//! ```ignore
//! input ─▶ prompt ─▶ bounded generation ─▶ hallucination filter ─┐
//!                                                                ├─▶ tokens + embeddings ─▶ cosine
//! input ─▶ prompt ─▶ bounded generation ─▶ hallucination filter ─┘
//! ```
//!
//! The stages live in their own crates (`inference`, `sanitize`, `embed`,
//! `scoring`) and are re-exported here. A generation that times out or fails
//! on either side fails the whole comparison with
//! [`PipelineError::InferenceUnavailable`]; a degenerate embedding only makes
//! [`ComparisonResult::similarity`] an error.
//!
//! ```
//! use std::sync::Arc;
//! use gencompare::{
//!     ByteTokenizer, ComparisonPipeline, PipelineConfig, PromptTemplate, SamplingConfig,
//!     Script, ScriptedGenerator, StubEmbedder,
//! };
//!
//! let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! rt.block_on(async {
//!     let pipeline = ComparisonPipeline::new(
//!         Arc::new(ScriptedGenerator::new(Script::complete(["Paris"]))),
//!         Arc::new(ByteTokenizer),
//!         Arc::new(StubEmbedder::default()),
//!         PipelineConfig::default(),
//!     );
//!     let result = pipeline
//!         .compare("France", "Île-de-France", &PromptTemplate::default(), &SamplingConfig::default())
//!         .await
//!         .unwrap();
//!     assert!((result.score().unwrap() - 1.0).abs() < 1e-6);
//! });
//! ```

pub mod config;
mod error;
mod metrics;
mod pipeline;
mod references;
mod render;
mod result;
mod side;
mod template;

pub use crate::config::{CompareConfig, ConfigLoadError};
pub use crate::error::{InferenceFailure, PipelineError};
pub use crate::metrics::PipelineMetrics;
pub use crate::pipeline::{ComparisonPipeline, PipelineConfig};
pub use crate::references::{parse_references, RankedReference, Reference, ReferenceRanking};
pub use crate::render::render_tokens;
pub use crate::result::ComparisonResult;
pub use crate::side::Side;
pub use crate::template::{PromptTemplate, DEFAULT_PLACEHOLDER};

pub use embed::{
    ByteTokenizer, EmbedError, Embedder, HfTokenizer, HttpEmbedder, HttpEmbedderConfig,
    StubEmbedder, TokenDecoder, Tokenizer,
};
pub use inference::{
    CancellationToken, GenerationError, GenerationOutcome, LlamaServerConfig,
    LlamaServerGenerator, SamplingConfig, Script, ScriptedGenerator, TextGenerator,
};
pub use sanitize::{AnomalyTag, CleanedAnswer, FilterRules, MultilineRule};
pub use scoring::{cosine_similarity, EmbeddingVector, ScoreError};
