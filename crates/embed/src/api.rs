//! Remote embedding client.
//!
//! Speaks two payload dialects: Hugging Face feature-extraction
//! (`{"inputs": text}`) and OpenAI-compatible `/embeddings`
//! (`{"input": text, "model": name}`). Token-level responses are mean-pooled so
//! callers always get one vector per string.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use scoring::{l2_normalize_in_place, EmbeddingVector};

use crate::pool::mean_pool;
use crate::retry::{execute_with_retry_async, is_retryable_status, Attempt, RetryConfig};
use crate::{EmbedError, Embedder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiProvider {
    #[default]
    HuggingFace,
    OpenAi,
}

/// Settings for [`HttpEmbedder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpEmbedderConfig {
    /// Full endpoint URL.
    pub api_url: String,
    pub provider: ApiProvider,
    /// Model name sent with OpenAI-style payloads.
    pub model_name: String,
    /// Authorization header value (e.g., `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Normalize the pooled vector to unit length.
    pub normalize: bool,
    pub retry: RetryConfig,
}

impl Default for HttpEmbedderConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            provider: ApiProvider::HuggingFace,
            model_name: "all-MiniLM-L12-v2".into(),
            api_auth_header: None,
            timeout_ms: 30_000,
            normalize: true,
            retry: RetryConfig::default(),
        }
    }
}

pub struct HttpEmbedder {
    client: reqwest::Client,
    cfg: HttpEmbedderConfig,
}

impl HttpEmbedder {
    pub fn new(cfg: HttpEmbedderConfig) -> Result<Self, EmbedError> {
        if cfg.api_url.trim().is_empty() {
            return Err(EmbedError::InvalidConfig("api_url is required".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| EmbedError::InvalidConfig(e.to_string()))?;
        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &HttpEmbedderConfig {
        &self.cfg
    }

    async fn send(&self, payload: &Value) -> Result<Value, Attempt<EmbedError>> {
        let mut request = self.client.post(&self.cfg.api_url).json(payload);
        if let Some(header) = self.cfg.api_auth_header.as_deref() {
            request = request.header(reqwest::header::AUTHORIZATION, header);
        }

        let response = request.send().await.map_err(|e| {
            let err = EmbedError::Request(format!("HTTP request failed: {e}"));
            if e.is_builder() {
                Attempt::Fatal(err)
            } else {
                Attempt::Retryable(err)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = EmbedError::Request(format!("HTTP error {status}: {body}"));
            return Err(if is_retryable_status(status.as_u16()) {
                Attempt::Retryable(err)
            } else {
                Attempt::Fatal(err)
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Attempt::Fatal(EmbedError::Response(e.to_string())))
    }
}

pub(crate) fn build_payload(cfg: &HttpEmbedderConfig, text: &str) -> Value {
    match cfg.provider {
        ApiProvider::HuggingFace => json!({ "inputs": text }),
        ApiProvider::OpenAi => json!({ "input": text, "model": cfg.model_name }),
    }
}

/// Extract exactly one pooled vector from a provider response.
pub(crate) fn parse_embedding(provider: ApiProvider, body: &Value) -> Result<Vec<f32>, EmbedError> {
    let value = match provider {
        ApiProvider::OpenAi => body
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|item| item.get("embedding"))
            .ok_or_else(|| EmbedError::Response("missing data[0].embedding".into()))?,
        ApiProvider::HuggingFace => body,
    };

    match nesting_depth(value) {
        // [dim]
        1 => as_vector(value),
        // [tokens][dim] or [1][dim]
        2 => mean_pool(&as_matrix(value)?),
        // [1][tokens][dim]
        3 => {
            let first = value
                .get(0)
                .ok_or_else(|| EmbedError::Response("empty batch".into()))?;
            mean_pool(&as_matrix(first)?)
        }
        depth => Err(EmbedError::Response(format!(
            "unsupported embedding nesting depth {depth}"
        ))),
    }
}

fn nesting_depth(value: &Value) -> usize {
    let mut depth = 0;
    let mut current = value;
    while let Some(first) = current.as_array().and_then(|items| items.first()) {
        depth += 1;
        current = first;
    }
    depth
}

fn as_vector(value: &Value) -> Result<Vec<f32>, EmbedError> {
    let items = value
        .as_array()
        .ok_or_else(|| EmbedError::Response("expected an array of numbers".into()))?;
    items
        .iter()
        .map(|item| {
            item.as_f64()
                .map(|x| x as f32)
                .ok_or_else(|| EmbedError::Response(format!("non-numeric component {item}")))
        })
        .collect()
}

fn as_matrix(value: &Value) -> Result<Vec<Vec<f32>>, EmbedError> {
    value
        .as_array()
        .ok_or_else(|| EmbedError::Response("expected an array of vectors".into()))?
        .iter()
        .map(as_vector)
        .collect()
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbedError> {
        let start = Instant::now();
        let payload = build_payload(&self.cfg, text);
        let payload = &payload;
        let outcome = execute_with_retry_async(&self.cfg.retry, move |attempt| {
            async move {
                if attempt > 0 {
                    debug!(attempt, url = %self.cfg.api_url, "embed_retry");
                }
                self.send(payload).await
            }
        })
        .await;

        let elapsed_micros = start.elapsed().as_micros();
        let body = match outcome.result {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, attempts = outcome.attempts, elapsed_micros, "embed_failure");
                return Err(err);
            }
        };

        let mut vector = parse_embedding(self.cfg.provider, &body)?;
        if self.cfg.normalize {
            l2_normalize_in_place(&mut vector);
        }
        info!(
            dim = vector.len(),
            attempts = outcome.attempts,
            elapsed_micros,
            "embed_success"
        );
        Ok(EmbeddingVector::new(vector))
    }
}
