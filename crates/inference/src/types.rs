use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall-clock budget for one generation call when nothing else is configured.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20);

/// Sampling knobs forwarded to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// `0.0` means greedy decoding.
    pub temperature: f32,
    /// Generation stops once any of these is produced.
    pub stop_sequences: Vec<String>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            stop_sequences: vec![
                "Question:".into(),
                "#".into(),
                "Question: ".into(),
                ".\n".into(),
            ],
            max_tokens: 600,
        }
    }
}

/// One bounded generation call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    prompt: String,
    sampling: SamplingConfig,
    #[serde(with = "crate::serde_millis")]
    deadline: Duration,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, sampling: SamplingConfig, deadline: Duration) -> Self {
        Self {
            prompt: prompt.into(),
            sampling,
            deadline,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Result of exactly one bounded generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// The fragment stream ended normally; holds the full unmodified text.
    Completed(String),
    /// The deadline elapsed first. Partial text is discarded.
    TimedOut,
    /// The generator raised an error other than cancellation.
    Failed(String),
}

impl GenerationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, GenerationOutcome::Completed(_))
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationOutcome::Completed(_) => "completed",
            GenerationOutcome::TimedOut => "timed_out",
            GenerationOutcome::Failed(_) => "failed",
        }
    }

    pub fn completed_text(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Completed(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_defaults() {
        let cfg = SamplingConfig::default();
        assert_eq!(cfg.temperature, 0.0);
        assert_eq!(cfg.max_tokens, 600);
        assert!(cfg.stop_sequences.iter().any(|s| s == "Question:"));
    }

    #[test]
    fn request_serializes_deadline_as_millis() {
        let request = GenerationRequest::new(
            "hello",
            SamplingConfig::default(),
            Duration::from_millis(1500),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["deadline"], 1500);

        let back: GenerationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back.deadline(), Duration::from_millis(1500));
        assert_eq!(back.prompt(), "hello");
    }

    #[test]
    fn outcome_kinds() {
        assert_eq!(GenerationOutcome::Completed("x".into()).kind(), "completed");
        assert_eq!(GenerationOutcome::TimedOut.kind(), "timed_out");
        assert_eq!(GenerationOutcome::Failed("boom".into()).kind(), "failed");
        assert_eq!(
            GenerationOutcome::Completed("x".into()).completed_text(),
            Some("x")
        );
        assert!(GenerationOutcome::TimedOut.completed_text().is_none());
    }
}
