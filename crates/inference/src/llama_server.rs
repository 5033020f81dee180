//! Streaming client for a llama.cpp-compatible `/completion` endpoint.
//!
//! The server answers with server-sent events, one JSON object per `data:`
//! line carrying a `content` fragment and a `stop` flag. Dropping the stream
//! drops the response body, which aborts generation server-side.

use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{FragmentStream, GenerationError, GenerationRequest, TextGenerator};

/// Connection settings for [`LlamaServerGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlamaServerConfig {
    /// Base URL, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Sent as `Authorization: Bearer <key>` when present.
    pub api_key: Option<String>,
    /// TCP connect timeout in milliseconds. The generation deadline is enforced
    /// by the runner, not here.
    pub connect_timeout_ms: u64,
}

impl Default for LlamaServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            api_key: None,
            connect_timeout_ms: 5_000,
        }
    }
}

pub struct LlamaServerGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl LlamaServerGenerator {
    pub fn new(cfg: &LlamaServerConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/completion", cfg.base_url.trim_end_matches('/')),
            api_key: cfg.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub(crate) fn completion_payload(request: &GenerationRequest) -> serde_json::Value {
    let sampling = request.sampling();
    json!({
        "prompt": request.prompt(),
        "stream": true,
        "temperature": sampling.temperature,
        "stop": sampling.stop_sequences,
        "n_predict": sampling.max_tokens,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionChunk {
    content: String,
    stop: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub(crate) content: String,
    pub(crate) stop: bool,
}

/// Parse one SSE line. `Ok(None)` for comments, blank lines, and non-data fields.
pub(crate) fn parse_sse_line(line: &str) -> Result<Option<SseEvent>, GenerationError> {
    let line = line.trim_end_matches('\r');
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }
    if data == "[DONE]" {
        return Ok(Some(SseEvent {
            content: String::new(),
            stop: true,
        }));
    }
    let chunk: CompletionChunk = serde_json::from_str(data)
        .map_err(|e| GenerationError::Protocol(format!("bad completion chunk: {e}")))?;
    Ok(Some(SseEvent {
        content: chunk.content,
        stop: chunk.stop,
    }))
}

/// Pop one `\n`-terminated line off the front of `buffer`.
fn take_line(buffer: &mut Vec<u8>) -> Option<Result<String, GenerationError>> {
    let pos = buffer.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = buffer.drain(..=pos).collect();
    Some(
        String::from_utf8(line)
            .map(|s| s.trim_end_matches('\n').to_string())
            .map_err(|e| GenerationError::Protocol(format!("non-utf8 event line: {e}"))),
    )
}

enum SseState {
    Connect(reqwest::RequestBuilder),
    Reading {
        body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
        buffer: Vec<u8>,
    },
    Done,
}

impl TextGenerator for LlamaServerGenerator {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
        cancel: CancellationToken,
    ) -> FragmentStream<'a> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .json(&completion_payload(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        stream::unfold(SseState::Connect(builder), move |state| {
            let cancel = cancel.clone();
            async move { next_fragment(state, cancel).await }
        })
        .boxed()
    }
}

async fn next_fragment(
    mut state: SseState,
    cancel: CancellationToken,
) -> Option<(Result<String, GenerationError>, SseState)> {
    loop {
        state = match state {
            SseState::Done => return None,
            SseState::Connect(builder) => {
                let response = tokio::select! {
                    _ = cancel.cancelled() => {
                        return Some((Err(GenerationError::Cancelled), SseState::Done));
                    }
                    response = builder.send() => response,
                };
                match response.and_then(|r| r.error_for_status()) {
                    Ok(response) => SseState::Reading {
                        body: response
                            .bytes_stream()
                            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                            .boxed(),
                        buffer: Vec::new(),
                    },
                    Err(err) => {
                        return Some((
                            Err(GenerationError::Transport(err.to_string())),
                            SseState::Done,
                        ));
                    }
                }
            }
            SseState::Reading { mut body, mut buffer } => {
                if let Some(line) = take_line(&mut buffer) {
                    let event = match line.and_then(|line| parse_sse_line(&line)) {
                        Ok(event) => event,
                        Err(err) => return Some((Err(err), SseState::Done)),
                    };
                    let next = SseState::Reading { body, buffer };
                    match event {
                        None => next,
                        Some(SseEvent { content, stop }) => {
                            let next = if stop { SseState::Done } else { next };
                            if content.is_empty() {
                                next
                            } else {
                                return Some((Ok(content), next));
                            }
                        }
                    }
                } else {
                    let chunk = tokio::select! {
                        _ = cancel.cancelled() => {
                            return Some((Err(GenerationError::Cancelled), SseState::Done));
                        }
                        chunk = body.next() => chunk,
                    };
                    match chunk {
                        Some(Ok(bytes)) => {
                            buffer.extend_from_slice(&bytes);
                            SseState::Reading { body, buffer }
                        }
                        Some(Err(err)) => {
                            return Some((
                                Err(GenerationError::Transport(err.to_string())),
                                SseState::Done,
                            ));
                        }
                        None if buffer.is_empty() => return None,
                        // Unterminated trailing line.
                        None => {
                            buffer.push(b'\n');
                            SseState::Reading {
                                body: stream::empty().boxed(),
                                buffer,
                            }
                        }
                    }
                }
            }
        };
    }
}
