//! Hallucination cleanup for raw generations.
//!
//! Models misbehave in a couple of predictable ways: they echo a label line
//! before the actual answer, or they leak a marker from the few-shot prompt
//! (`Result: ...`). [`clean`] applies the configured [`FilterRules`] in order and
//! records every correction as an [`AnomalyTag`] on the returned
//! [`CleanedAnswer`]. Corrections are not errors; processing always continues.
//!
//! ```
//! use sanitize::{clean_default, AnomalyTag};
//!
//! let answer = clean_default("Label line\nReal answer");
//! assert_eq!(answer.text(), "Real answer");
//! assert!(answer.has_tag(AnomalyTag::MultilineHallucination));
//! ```

mod rules;
mod types;

use tracing::debug;

pub use crate::rules::{FilterRules, MultilineRule, DEFAULT_ECHO_PREFIX};
pub use crate::types::{AnomalyTag, CleanedAnswer};

/// Clean `raw` with the default rules.
pub fn clean_default(raw: &str) -> CleanedAnswer {
    clean(raw, &FilterRules::default())
}

/// Apply `rules` to `raw` and return the canonical answer.
///
/// Applying it again to its own output is a no-op.
pub fn clean(raw: &str, rules: &FilterRules) -> CleanedAnswer {
    let mut tags = Vec::new();
    let mut text = raw.trim();

    if let Some(rule) = rules.multiline.as_ref() {
        if let Some(segment) = pick_segment(text, rule) {
            if segment != text {
                tags.push(AnomalyTag::MultilineHallucination);
            }
            text = segment;
        }
    }

    if let Some(stripped) = strip_echo_prefixes(text, &rules.echo_prefixes) {
        tags.push(AnomalyTag::PromptEchoArtifact);
        text = stripped;
    }

    if !tags.is_empty() {
        debug!(tags = ?tags, raw_len = raw.len(), cleaned_len = text.len(), "sanitize_corrected");
    }

    CleanedAnswer::new(text.to_string(), tags)
}

/// `None` when there is no newline to split on.
fn pick_segment<'a>(text: &'a str, rule: &MultilineRule) -> Option<&'a str> {
    if !text.contains('\n') {
        return None;
    }
    let segments: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();
    segments
        .get(rule.segment_index)
        .or_else(|| segments.last())
        .copied()
}

/// Strips markers until none match; `None` when nothing was stripped.
fn strip_echo_prefixes<'a>(text: &'a str, prefixes: &[String]) -> Option<&'a str> {
    let mut current = text;
    let mut stripped = false;
    loop {
        let next = prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| current.strip_prefix(prefix.as_str()));
        match next {
            Some(rest) => {
                current = rest.trim();
                stripped = true;
            }
            None => break,
        }
    }
    stripped.then_some(current)
}
