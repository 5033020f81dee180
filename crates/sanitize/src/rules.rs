use serde::{Deserialize, Serialize};

/// Named, tunable cleanup rules.
///
/// The defaults were tuned against one model/prompt pairing: the real answer
/// tends to land on the second non-empty line, and exemplar output leaks the
/// `Result:` marker. Other models will likely need different values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Multiline rule; `None` disables it.
    pub multiline: Option<MultilineRule>,
    /// Markers stripped from the start of the answer. Empty disables the rule.
    pub echo_prefixes: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            multiline: Some(MultilineRule::default()),
            echo_prefixes: vec![DEFAULT_ECHO_PREFIX.to_string()],
        }
    }
}

impl FilterRules {
    /// Rules that never modify the input apart from trimming.
    pub fn disabled() -> Self {
        Self {
            multiline: None,
            echo_prefixes: Vec::new(),
        }
    }
}

/// Marker leaked by few-shot exemplars.
pub const DEFAULT_ECHO_PREFIX: &str = "Result:";

/// Picks one non-empty line out of a multiline generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultilineRule {
    /// Zero-based index among the non-empty segments. Falls back to the last
    /// segment when fewer exist.
    pub segment_index: usize,
}

impl Default for MultilineRule {
    fn default() -> Self {
        Self { segment_index: 1 }
    }
}
