use std::sync::Arc;
use std::time::{Duration, Instant};

use embed::EmbedError;
use inference::GenerationOutcome;
use scoring::ScoreError;

use crate::Side;

/// Observer for per-stage latency and outcome. Installed per pipeline.
pub trait PipelineMetrics: Send + Sync {
    fn record_inference(&self, side: Side, latency: Duration, outcome: &GenerationOutcome);
    fn record_embedding(&self, side: Side, latency: Duration, result: Result<(), &EmbedError>);
    fn record_similarity(&self, result: Result<f32, &ScoreError>);
}

pub(crate) struct MetricsSpan<'a> {
    recorder: &'a dyn PipelineMetrics,
    start: Instant,
}

impl<'a> MetricsSpan<'a> {
    pub(crate) fn start(recorder: Option<&'a Arc<dyn PipelineMetrics>>) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: recorder.as_ref(),
            start: Instant::now(),
        })
    }

    pub(crate) fn record_inference(self, side: Side, outcome: &GenerationOutcome) {
        self.recorder
            .record_inference(side, self.start.elapsed(), outcome);
    }

    pub(crate) fn record_embedding(self, side: Side, result: Result<(), &EmbedError>) {
        self.recorder
            .record_embedding(side, self.start.elapsed(), result);
    }
}
