use sanitize::CleanedAnswer;
use scoring::ScoreError;
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};

use crate::{ComparisonPipeline, PipelineError, PromptTemplate, Side};
use inference::SamplingConfig;

/// One labelled reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub label: String,
    pub text: String,
}

impl Reference {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    /// Parse a `label:text` line.
    ///
    /// The text is the second `:`-separated field, so anything after a second
    /// colon is ignored. A line without a colon yields empty text.
    pub fn parse_line(line: &str) -> Self {
        let mut fields = line.split(':');
        let label = fields.next().unwrap_or_default().trim();
        let text = fields.next().unwrap_or_default().trim();
        Self::new(label, text)
    }
}

/// Parse one reference per non-blank line.
pub fn parse_references(input: &str) -> Vec<Reference> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(Reference::parse_line)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedReference {
    pub reference: Reference,
    pub similarity: Result<f32, ScoreError>,
}

/// A generated answer scored against every reference, best match first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRanking {
    pub answer: CleanedAnswer,
    pub entries: Vec<RankedReference>,
}

impl ReferenceRanking {
    /// Highest-scoring reference that produced a score at all.
    pub fn best(&self) -> Option<&RankedReference> {
        self.entries.first().filter(|entry| entry.similarity.is_ok())
    }
}

impl ComparisonPipeline {
    /// Generate one answer for `input` and rank `references` by similarity to it.
    ///
    /// Entries whose score is unavailable keep their [`ScoreError`] and sort
    /// after every scored entry. Empty answers and empty reference texts are
    /// never embedded; they score as [`ScoreError::EmptyAnswer`].
    pub async fn compare_against_references(
        &self,
        input: &str,
        template: &PromptTemplate,
        sampling: &SamplingConfig,
        references: &[Reference],
    ) -> Result<ReferenceRanking, PipelineError> {
        template.validate()?;
        let span = tracing::info_span!("pipeline.rank", references = references.len());

        async {
            let answer = self.answer(Side::A, input, template, sampling).await?;
            let answer_vector = self.embed_answer(Side::A, &answer).await?;

            let mut entries = Vec::with_capacity(references.len());
            for reference in references {
                let vector = if reference.text.is_empty() {
                    None
                } else {
                    let vector = self.embed_raw(Side::B, &reference.text).await.map_err(
                        |source| PipelineError::ReferenceEmbedding {
                            label: reference.label.clone(),
                            source,
                        },
                    )?;
                    Some(vector)
                };
                entries.push(RankedReference {
                    reference: reference.clone(),
                    similarity: self.score(answer_vector.as_ref(), vector.as_ref()),
                });
            }
            sort_ranked(&mut entries);

            info!(
                best = ?entries.first().map(|e| e.reference.label.as_str()),
                "reference_ranking_complete"
            );
            Ok(ReferenceRanking { answer, entries })
        }
        .instrument(span)
        .await
    }
}

fn sort_ranked(entries: &mut [RankedReference]) {
    entries.sort_by(|a, b| match (&a.similarity, &b.similarity) {
        (Ok(x), Ok(y)) => y.total_cmp(x),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_label_and_text() {
        let r = Reference::parse_line("weak: password123");
        assert_eq!(r.label, "weak");
        assert_eq!(r.text, "password123");
    }

    #[test]
    fn text_stops_at_second_colon() {
        let r = Reference::parse_line("a:b:c");
        assert_eq!(r.text, "b");
    }

    #[test]
    fn missing_colon_gives_empty_text() {
        let r = Reference::parse_line("lonely");
        assert_eq!(r.label, "lonely");
        assert_eq!(r.text, "");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let refs = parse_references("a: one\n\n  \nb: two\n");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1], Reference::new("b", "two"));
    }

    #[test]
    fn scored_entries_sort_before_errors() {
        let entry = |label: &str, similarity| RankedReference {
            reference: Reference::new(label, ""),
            similarity,
        };
        let mut entries = vec![
            entry("err", Err(ScoreError::EmptyVector)),
            entry("low", Ok(0.1)),
            entry("high", Ok(0.9)),
        ];
        sort_ranked(&mut entries);
        let labels: Vec<&str> = entries.iter().map(|e| e.reference.label.as_str()).collect();
        assert_eq!(labels, vec!["high", "low", "err"]);
    }
}
