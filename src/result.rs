use std::fmt;

use sanitize::CleanedAnswer;
use scoring::ScoreError;
use serde::{Deserialize, Serialize};

use crate::Side;

/// Everything one comparison produced.
///
/// `similarity` carries scorer failures (zero vectors, dimension mismatch) as
/// values so they stay distinguishable from inference failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub answer_a: CleanedAnswer,
    pub answer_b: CleanedAnswer,
    pub tokens_a: Vec<String>,
    pub tokens_b: Vec<String>,
    pub similarity: Result<f32, ScoreError>,
}

impl ComparisonResult {
    pub fn answer(&self, side: Side) -> &CleanedAnswer {
        match side {
            Side::A => &self.answer_a,
            Side::B => &self.answer_b,
        }
    }

    pub fn tokens(&self, side: Side) -> &[String] {
        match side {
            Side::A => &self.tokens_a,
            Side::B => &self.tokens_b,
        }
    }

    /// Token display strings joined with `|`.
    pub fn transcript(&self, side: Side) -> String {
        self.tokens(side).join("|")
    }

    pub fn score(&self) -> Option<f32> {
        self.similarity.as_ref().ok().copied()
    }

    /// Sides whose cleaned answer came out empty.
    pub fn soft_failures(&self) -> Vec<Side> {
        [Side::A, Side::B]
            .into_iter()
            .filter(|side| self.answer(*side).is_empty())
            .collect()
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in [Side::A, Side::B] {
            let answer = self.answer(side);
            write!(f, "{side}: {}", answer.text())?;
            if !answer.tags().is_empty() {
                let tags: Vec<&str> = answer.tags().iter().map(|tag| tag.as_str()).collect();
                write!(f, " [{}]", tags.join(", "))?;
            }
            writeln!(f)?;
            writeln!(f, "  tokens: {}", self.transcript(side))?;
        }
        match &self.similarity {
            Ok(score) => write!(f, "similarity: {score:.4}"),
            Err(err) => write!(f, "similarity unavailable: {err}"),
        }
    }
}
