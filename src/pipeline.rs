use std::sync::Arc;
use std::time::{Duration, Instant};

use embed::{Embedder, Tokenizer};
use inference::{BoundedRunner, GenerationOutcome, SamplingConfig, TextGenerator, DEFAULT_DEADLINE};
use sanitize::{CleanedAnswer, FilterRules};
use scoring::{EmbeddingVector, Operand, ScoreError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};

use crate::metrics::MetricsSpan;
use crate::{
    render_tokens, ComparisonResult, InferenceFailure, PipelineError, PipelineMetrics,
    PromptTemplate, Side,
};

/// Knobs for one [`ComparisonPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Wall-clock budget for each side's generation.
    #[serde(rename = "deadline_ms", with = "inference::serde_millis")]
    pub deadline: Duration,
    pub filter: FilterRules,
    /// Run both generations with `tokio::join!`. Only safe when the generator
    /// handles independent concurrent calls.
    pub concurrent_inference: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            filter: FilterRules::default(),
            concurrent_inference: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_concurrent_inference(mut self, concurrent: bool) -> Self {
        self.concurrent_inference = concurrent;
        self
    }

    pub fn with_filter(mut self, filter: FilterRules) -> Self {
        self.filter = filter;
        self
    }
}

/// Generate, clean, embed and score two inputs.
///
/// Holds no mutable state of its own; the collaborators are shared handles
/// injected at construction.
#[derive(Clone)]
pub struct ComparisonPipeline {
    runner: BoundedRunner,
    tokenizer: Arc<dyn Tokenizer>,
    embedder: Arc<dyn Embedder>,
    config: PipelineConfig,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl ComparisonPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        tokenizer: Arc<dyn Tokenizer>,
        embedder: Arc<dyn Embedder>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            runner: BoundedRunner::new(generator),
            tokenizer,
            embedder,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compare the model's answers for `input_a` and `input_b`.
    ///
    /// A timeout or failure on either side aborts the comparison before any
    /// tokenization or embedding happens.
    pub async fn compare(
        &self,
        input_a: &str,
        input_b: &str,
        template: &PromptTemplate,
        sampling: &SamplingConfig,
    ) -> Result<ComparisonResult, PipelineError> {
        template.validate()?;
        let span = tracing::info_span!(
            "pipeline.compare",
            concurrent = self.config.concurrent_inference,
            deadline_ms = self.config.deadline.as_millis() as u64
        );

        async {
            let start = Instant::now();
            let (answer_a, answer_b) = if self.config.concurrent_inference {
                let (a, b) = tokio::join!(
                    self.answer(Side::A, input_a, template, sampling),
                    self.answer(Side::B, input_b, template, sampling)
                );
                (a?, b?)
            } else {
                let a = self.answer(Side::A, input_a, template, sampling).await?;
                let b = self.answer(Side::B, input_b, template, sampling).await?;
                (a, b)
            };

            let result = self.assemble(answer_a, answer_b).await;
            let elapsed_micros = start.elapsed().as_micros() as u64;
            match &result {
                Ok(result) => info!(
                    score = ?result.score(),
                    soft_failures = result.soft_failures().len(),
                    elapsed_micros,
                    "comparison_complete"
                ),
                Err(err) => warn!(error = %err, elapsed_micros, "comparison_failure"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Score two caller-supplied texts without generating anything.
    pub async fn compare_texts(
        &self,
        text_a: &str,
        text_b: &str,
    ) -> Result<ComparisonResult, PipelineError> {
        let span = tracing::info_span!("pipeline.compare_texts");
        self.assemble(CleanedAnswer::verbatim(text_a), CleanedAnswer::verbatim(text_b))
            .instrument(span)
            .await
    }

    /// Generate and clean the answer for one side.
    pub(crate) async fn answer(
        &self,
        side: Side,
        input: &str,
        template: &PromptTemplate,
        sampling: &SamplingConfig,
    ) -> Result<CleanedAnswer, PipelineError> {
        let prompt = template.render(input);
        let metrics = MetricsSpan::start(self.metrics.as_ref());
        let outcome = self.runner.run(&prompt, sampling, self.config.deadline).await;
        if let Some(span) = metrics {
            span.record_inference(side, &outcome);
        }

        match outcome {
            GenerationOutcome::Completed(raw) => {
                let answer = sanitize::clean(&raw, &self.config.filter);
                if answer.is_empty() {
                    warn!(side = %side, "empty_answer");
                }
                Ok(answer)
            }
            GenerationOutcome::TimedOut => Err(PipelineError::InferenceUnavailable {
                side,
                reason: InferenceFailure::TimedOut,
            }),
            GenerationOutcome::Failed(reason) => Err(PipelineError::InferenceUnavailable {
                side,
                reason: InferenceFailure::Failed(reason),
            }),
        }
    }

    pub(crate) async fn embed(&self, side: Side, text: &str) -> Result<EmbeddingVector, PipelineError> {
        self.embed_raw(side, text)
            .await
            .map_err(|source| PipelineError::Embedding { side, source })
    }

    /// Embed without attaching a side to the error.
    pub(crate) async fn embed_raw(
        &self,
        side: Side,
        text: &str,
    ) -> Result<EmbeddingVector, embed::EmbedError> {
        let metrics = MetricsSpan::start(self.metrics.as_ref());
        let result = self.embedder.embed(text).await;
        if let Some(span) = metrics {
            span.record_embedding(side, result.as_ref().map(|_| ()));
        }
        result
    }

    /// Embed a cleaned answer. Empty answers are not sent to the embedder.
    pub(crate) async fn embed_answer(
        &self,
        side: Side,
        answer: &CleanedAnswer,
    ) -> Result<Option<EmbeddingVector>, PipelineError> {
        if answer.is_empty() {
            return Ok(None);
        }
        self.embed(side, answer.text()).await.map(Some)
    }

    /// Score two vectors. A missing vector means that side had no text to embed.
    pub(crate) fn score(
        &self,
        a: Option<&EmbeddingVector>,
        b: Option<&EmbeddingVector>,
    ) -> Result<f32, ScoreError> {
        let similarity = match (a, b) {
            (None, _) => Err(ScoreError::EmptyAnswer {
                side: Operand::Left,
            }),
            (_, None) => Err(ScoreError::EmptyAnswer {
                side: Operand::Right,
            }),
            (Some(a), Some(b)) => a.similarity(b),
        };
        if let Err(err) = &similarity {
            warn!(error = %err, "similarity_unavailable");
        }
        if let Some(metrics) = self.metrics.as_ref() {
            metrics.record_similarity(similarity.as_ref().copied());
        }
        similarity
    }

    async fn assemble(
        &self,
        answer_a: CleanedAnswer,
        answer_b: CleanedAnswer,
    ) -> Result<ComparisonResult, PipelineError> {
        let tokens_a = self.render(Side::A, answer_a.text())?;
        let tokens_b = self.render(Side::B, answer_b.text())?;

        let vector_a = self.embed_answer(Side::A, &answer_a).await?;
        let vector_b = self.embed_answer(Side::B, &answer_b).await?;
        let similarity = self.score(vector_a.as_ref(), vector_b.as_ref());

        Ok(ComparisonResult {
            answer_a,
            answer_b,
            tokens_a,
            tokens_b,
            similarity,
        })
    }

    fn render(&self, side: Side, text: &str) -> Result<Vec<String>, PipelineError> {
        render_tokens(self.tokenizer.as_ref(), text)
            .map_err(|source| PipelineError::Tokenizer { side, source })
    }
}
