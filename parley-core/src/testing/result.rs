//! Per-execution results

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::seconds;

/// How many expected keywords an answer contains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    /// Expected keywords present in the answer, in suite order
    pub found: Vec<String>,
    /// Number of expected keywords
    pub total: usize,
    /// `found / total`
    pub score: f64,
}

impl KeywordMatch {
    /// Case-insensitive substring match of `expected` against `answer`.
    ///
    /// `expected` must not be empty.
    pub fn compute(expected: &[String], answer: &str) -> Self {
        let answer = answer.to_lowercase();
        let found: Vec<String> = expected
            .iter()
            .filter(|keyword| answer.contains(&keyword.to_lowercase()))
            .cloned()
            .collect();
        let total = expected.len();
        let score = if total == 0 {
            1.0
        } else {
            found.len() as f64 / total as f64
        };
        Self {
            found,
            total,
            score,
        }
    }

    /// Every expected keyword was found
    pub fn is_complete(&self) -> bool {
        self.score >= 1.0
    }
}

/// Answer quality metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseMetrics {
    /// Present when the case has expected keywords and an answer was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_match: Option<KeywordMatch>,
}

/// Outcome of one test case in one repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: String,
    pub question: String,

    /// `None` when the chatbot failed
    pub answer: Option<String>,

    /// Answered without error and, if keywords were expected, all were found
    pub success: bool,

    /// Failure description
    pub error: Option<String>,

    /// Wall time spent in `get_answer`
    #[serde(with = "seconds")]
    pub execution_time: Duration,

    /// 1-based repetition the result belongs to
    pub repetition: u32,

    /// Answer length in characters
    pub answer_length: usize,

    #[serde(default)]
    pub metrics: CaseMetrics,

    /// When the case started
    pub started_at: DateTime<Utc>,
}

impl TestResult {
    /// The keyword score, if keywords were checked
    pub fn keyword_score(&self) -> Option<f64> {
        self.metrics.keyword_match.as_ref().map(|m| m.score)
    }
}
