use serde::{Deserialize, Serialize};

/// Which corrective rule fired while cleaning a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyTag {
    /// A label line was echoed before the real answer.
    MultilineHallucination,
    /// A few-shot exemplar marker leaked into the completion.
    PromptEchoArtifact,
}

impl AnomalyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyTag::MultilineHallucination => "multiline_hallucination",
            AnomalyTag::PromptEchoArtifact => "prompt_echo_artifact",
        }
    }
}

impl std::fmt::Display for AnomalyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical answer extracted from a raw generation, with the rules that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedAnswer {
    text: String,
    tags: Vec<AnomalyTag>,
}

impl CleanedAnswer {
    pub(crate) fn new(text: String, tags: Vec<AnomalyTag>) -> Self {
        Self { text, tags }
    }

    /// Wrap text that bypassed the rules (caller-supplied, not generated).
    pub fn verbatim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &[AnomalyTag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: AnomalyTag) -> bool {
        self.tags.contains(&tag)
    }

    /// An empty answer is a soft failure: reported, never fatal.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl AsRef<str> for CleanedAnswer {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
