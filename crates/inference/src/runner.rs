use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};

use crate::{
    GenerationError, GenerationOutcome, GenerationRequest, SamplingConfig, TextGenerator,
};

/// Drives one generator under a wall-clock deadline.
///
/// The runner never filters, retries, or returns partial text: a call resolves
/// to exactly one [`GenerationOutcome`].
#[derive(Clone)]
pub struct BoundedRunner {
    generator: Arc<dyn TextGenerator>,
}

impl BoundedRunner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Arc<dyn TextGenerator> {
        &self.generator
    }

    /// Build a request from parts and run it.
    pub async fn run(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
        deadline: Duration,
    ) -> GenerationOutcome {
        let request = GenerationRequest::new(prompt, sampling.clone(), deadline);
        self.run_request(&request).await
    }

    pub async fn run_request(&self, request: &GenerationRequest) -> GenerationOutcome {
        let span = tracing::info_span!(
            "inference.run",
            prompt_len = request.prompt().len(),
            deadline_ms = request.deadline().as_millis() as u64
        );
        run_bounded(self.generator.as_ref(), request)
            .instrument(span)
            .await
    }
}

/// Drain `generator` for `request` until the stream ends or the deadline elapses.
pub async fn run_bounded(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> GenerationOutcome {
    let start = Instant::now();
    let cancel = CancellationToken::new();
    // Fires on every exit path, including the caller dropping this future.
    let _cancel_on_exit = cancel.clone().drop_guard();

    let mut fragments = 0usize;
    let drain = async {
        let mut stream = generator.generate(request, cancel.child_token());
        let mut text = String::new();
        while let Some(fragment) = stream.next().await {
            text.push_str(&fragment?);
            fragments += 1;
        }
        Ok::<_, GenerationError>(text)
    };

    let outcome = match tokio::time::timeout(request.deadline(), drain).await {
        Ok(Ok(text)) => GenerationOutcome::Completed(text),
        Ok(Err(GenerationError::Cancelled)) => GenerationOutcome::TimedOut,
        Ok(Err(err)) => GenerationOutcome::Failed(err.to_string()),
        Err(_elapsed) => {
            cancel.cancel();
            GenerationOutcome::TimedOut
        }
    };

    let elapsed_micros = start.elapsed().as_micros();
    match &outcome {
        GenerationOutcome::Completed(text) => {
            info!(fragments, text_len = text.len(), elapsed_micros, "inference_completed");
        }
        GenerationOutcome::TimedOut => {
            warn!(fragments, elapsed_micros, "inference_timed_out");
        }
        GenerationOutcome::Failed(reason) => {
            warn!(fragments, error = %reason, elapsed_micros, "inference_failed");
        }
    }
    outcome
}
