//! YAML configuration for the comparison CLI.
//!
//! One file describes the prompt, sampling, pipeline behaviour and where the
//! generator, tokenizer and embedder come from.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! log_level: info
//!
//! prompt:
//!   template: "Question: {input}\nResult:"
//!   placeholder: "{input}"
//!
//! sampling:
//!   temperature: 0.0
//!   max_tokens: 600
//!   stop_sequences: ["Question:"]
//!
//! pipeline:
//!   deadline_ms: 20000
//!   concurrent_inference: false
//!   filter:
//!     multiline:
//!       segment_index: 1
//!     echo_prefixes: ["Result:"]
//!
//! generator:
//!   base_url: "http://127.0.0.1:8080"
//!
//! tokenizer:
//!   path: "models/tokenizer.json"
//!
//! embedder:
//!   mode: http
//!   http:
//!     api_url: "http://127.0.0.1:8081/embed"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use embed::HttpEmbedderConfig;
use inference::{LlamaServerConfig, SamplingConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PipelineConfig, PromptTemplate};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompareConfig {
    pub version: String,

    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub prompt: PromptTemplate,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub generator: LlamaServerConfig,

    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub embedder: EmbedderConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CompareConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: CompareConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.prompt
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;

        if self.pipeline.deadline.is_zero() {
            return Err(ConfigLoadError::Validation(
                "pipeline.deadline_ms must be greater than 0".into(),
            ));
        }
        if !self.sampling.temperature.is_finite() || self.sampling.temperature < 0.0 {
            return Err(ConfigLoadError::Validation(
                "sampling.temperature must be a non-negative number".into(),
            ));
        }
        if self.sampling.max_tokens == 0 {
            return Err(ConfigLoadError::Validation(
                "sampling.max_tokens must be greater than 0".into(),
            ));
        }
        self.embedder.validate()?;

        Ok(())
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            log_level: default_log_level(),
            prompt: PromptTemplate::default(),
            sampling: SamplingConfig::default(),
            pipeline: PipelineConfig::default(),
            generator: LlamaServerConfig::default(),
            tokenizer: TokenizerConfig::default(),
            embedder: EmbedderConfig::default(),
        }
    }
}

/// `tokenizer.json` to load. Without one, text is tokenized per UTF-8 byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub path: Option<PathBuf>,
    /// Add the model's special tokens (BOS/CLS) while encoding.
    pub add_special_tokens: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            path: None,
            add_special_tokens: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderMode {
    /// Deterministic hashed vectors, no model involved.
    #[default]
    Stub,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub mode: EmbedderMode,
    pub stub_dim: usize,
    pub http: HttpEmbedderConfig,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            mode: EmbedderMode::Stub,
            stub_dim: 384,
            http: HttpEmbedderConfig::default(),
        }
    }
}

impl EmbedderConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.mode {
            EmbedderMode::Stub if self.stub_dim == 0 => Err(ConfigLoadError::Validation(
                "embedder.stub_dim must be greater than 0".into(),
            )),
            EmbedderMode::Http if self.http.api_url.trim().is_empty() => Err(
                ConfigLoadError::Validation("embedder.http.api_url is required".into()),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
prompt:
  template: "Password: <pw>\nResult:"
  placeholder: "<pw>"
sampling:
  temperature: 0.2
  max_tokens: 32
pipeline:
  deadline_ms: 1500
  concurrent_inference: true
"#;

        let config = CompareConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.prompt.placeholder, "<pw>");
        assert_eq!(config.sampling.max_tokens, 32);
        assert_eq!(config.sampling.temperature, 0.2);
        assert_eq!(config.pipeline.deadline, Duration::from_millis(1500));
        assert!(config.pipeline.concurrent_inference);
        assert_eq!(config.embedder.mode, EmbedderMode::Stub);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
generator:
  base_url: "http://gpu-box:9000"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = CompareConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.generator.base_url, "http://gpu-box:9000");
        assert_eq!(config.pipeline.deadline, inference::DEFAULT_DEADLINE);
    }

    #[test]
    fn test_unsupported_version() {
        let err = CompareConfig::from_yaml("version: \"2.0\"").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_rejects_zero_deadline() {
        let yaml = "version: \"1.0\"\npipeline:\n  deadline_ms: 0\n";
        assert!(matches!(
            CompareConfig::from_yaml(yaml),
            Err(ConfigLoadError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_template_without_placeholder() {
        let yaml = "version: \"1.0\"\nprompt:\n  template: \"no slot\"\n";
        assert!(matches!(
            CompareConfig::from_yaml(yaml),
            Err(ConfigLoadError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_negative_temperature() {
        let yaml = "version: \"1.0\"\nsampling:\n  temperature: -1.0\n";
        assert!(CompareConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_http_embedder_needs_url() {
        let yaml = "version: \"1.0\"\nembedder:\n  mode: http\n";
        assert!(matches!(
            CompareConfig::from_yaml(yaml),
            Err(ConfigLoadError::Validation(_))
        ));
    }

    #[test]
    fn test_special_tokens_default_on() {
        let yaml = "version: \"1.0\"\ntokenizer:\n  path: tok.json\n";
        let config = CompareConfig::from_yaml(yaml).unwrap();
        assert!(config.tokenizer.add_special_tokens);
        assert!(CompareConfig::default().tokenizer.add_special_tokens);

        let yaml = "version: \"1.0\"\ntokenizer:\n  add_special_tokens: false\n";
        assert!(!CompareConfig::from_yaml(yaml).unwrap().tokenizer.add_special_tokens);
    }

    #[test]
    fn test_pipeline_section_has_no_sampling() {
        let json = serde_json::to_value(CompareConfig::default().pipeline).unwrap();
        assert!(json.get("sampling").is_none());
        assert_eq!(json["deadline_ms"], 20_000);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(CompareConfig::default().validate().is_ok());
    }
}
