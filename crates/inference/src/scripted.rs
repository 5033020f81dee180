//! In-process generator that replays scripted fragments.
//!
//! Handy for demos and tests: no model, fully deterministic, and it honours the
//! cancellation token the same way a real backend must.

use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{FragmentStream, GenerationError, GenerationRequest, TextGenerator};

/// How a script ends once its fragments are exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEnding {
    Complete,
    Fail(String),
    /// Never ends on its own; waits for cancellation.
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    fragments: Vec<String>,
    delay: Duration,
    ending: ScriptEnding,
}

impl Script {
    pub fn complete<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            delay: Duration::ZERO,
            ending: ScriptEnding::Complete,
        }
    }

    pub fn failing<I, S>(fragments: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ending: ScriptEnding::Fail(reason.into()),
            ..Self::complete(fragments)
        }
    }

    pub fn hanging<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ending: ScriptEnding::Hang,
            ..Self::complete(fragments)
        }
    }

    /// Wait `delay` before each fragment.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Picks a [`Script`] by substring match on the prompt, first match wins.
pub struct ScriptedGenerator {
    fallback: Script,
    rules: Vec<(String, Script)>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(fallback: Script) -> Self {
        Self {
            fallback,
            rules: Vec::new(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Use `script` for prompts containing `needle`.
    pub fn on(mut self, needle: impl Into<String>, script: Script) -> Self {
        self.rules.push((needle.into(), script));
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn script_for(&self, prompt: &str) -> &Script {
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, script)| script)
            .unwrap_or(&self.fallback)
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
        cancel: CancellationToken,
    ) -> FragmentStream<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.prompt().to_string());
        let script = self.script_for(request.prompt());

        stream::unfold(Some(0usize), move |state| {
            let cancel = cancel.clone();
            async move {
                let idx = state?;
                if let Some(fragment) = script.fragments.get(idx) {
                    if !script.delay.is_zero() {
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                return Some((Err(GenerationError::Cancelled), None));
                            }
                            _ = tokio::time::sleep(script.delay) => {}
                        }
                    }
                    if cancel.is_cancelled() {
                        return Some((Err(GenerationError::Cancelled), None));
                    }
                    return Some((Ok(fragment.clone()), Some(idx + 1)));
                }
                match &script.ending {
                    ScriptEnding::Complete => None,
                    ScriptEnding::Fail(reason) => {
                        Some((Err(GenerationError::Backend(reason.clone())), None))
                    }
                    ScriptEnding::Hang => {
                        cancel.cancelled().await;
                        Some((Err(GenerationError::Cancelled), None))
                    }
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SamplingConfig;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::new(prompt, SamplingConfig::default(), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn replays_fragments_in_order() {
        let generator = ScriptedGenerator::new(Script::complete(["a", "b", "c"]));
        let req = request("p");
        let items: Vec<_> = generator
            .generate(&req, CancellationToken::new())
            .collect()
            .await;
        assert_eq!(items, vec![Ok("a".into()), Ok("b".into()), Ok("c".into())]);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn picks_script_by_prompt_substring() {
        let generator = ScriptedGenerator::new(Script::complete(["fallback"]))
            .on("alpha", Script::complete(["first"]))
            .on("beta", Script::complete(["second"]));
        let req = request("question about beta");
        let items: Vec<_> = generator
            .generate(&req, CancellationToken::new())
            .collect()
            .await;
        assert_eq!(items, vec![Ok("second".into())]);
        assert_eq!(generator.prompts(), vec!["question about beta".to_string()]);
    }

    #[tokio::test]
    async fn stops_after_cancellation() {
        let generator = ScriptedGenerator::new(Script::complete(["a", "b"]));
        let req = request("p");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let items: Vec<_> = generator.generate(&req, cancel).collect().await;
        assert_eq!(items, vec![Err(GenerationError::Cancelled)]);
    }

    #[tokio::test]
    async fn failing_script_ends_with_backend_error() {
        let generator = ScriptedGenerator::new(Script::failing(["a"], "oom"));
        let req = request("p");
        let items: Vec<_> = generator
            .generate(&req, CancellationToken::new())
            .collect()
            .await;
        assert_eq!(
            items,
            vec![Ok("a".into()), Err(GenerationError::Backend("oom".into()))]
        );
    }
}
