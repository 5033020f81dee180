use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Placeholder used when a template does not name its own.
pub const DEFAULT_PLACEHOLDER: &str = "{input}";

/// Few-shot prompt with one designated placeholder for the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub template: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(
            "Answer with a single line.\n\
             Question: What is the capital of France?\n\
             Result: Paris\n\
             Question: {input}\n\
             Result:",
        )
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            placeholder: default_placeholder(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.placeholder.is_empty() {
            return Err(PipelineError::InvalidTemplate(
                "placeholder must not be empty".into(),
            ));
        }
        if !self.template.contains(&self.placeholder) {
            return Err(PipelineError::InvalidTemplate(format!(
                "template does not contain placeholder {}",
                self.placeholder
            )));
        }
        Ok(())
    }

    /// Substitute `input` at every placeholder occurrence.
    pub fn render(&self, input: &str) -> String {
        self.template.replace(&self.placeholder, input)
    }
}
