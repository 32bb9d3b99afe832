//! Aggregate pass/fail verdict

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::result::TestResult;
use super::seconds;
use super::suite::PassingCriteria;

/// A threshold checked against the whole result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Fraction of successful results
    SuccessRate,
    /// Mean execution time in seconds
    AverageTime,
}

/// Result of one gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub kind: GateKind,
    pub passed: bool,
    /// Measured value (fraction, or seconds)
    pub measured: f64,
    /// Configured threshold (fraction, or seconds)
    pub threshold: f64,
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed { "✔️ " } else { "❌" };
        match (self.kind, self.passed) {
            (GateKind::SuccessRate, false) => write!(
                f,
                "{} Success rate {:.1}% below required {:.1}%",
                mark,
                self.measured * 100.0,
                self.threshold * 100.0
            ),
            (GateKind::SuccessRate, true) => write!(
                f,
                "{} Success rate {:.1}% meets required {:.1}%",
                mark,
                self.measured * 100.0,
                self.threshold * 100.0
            ),
            (GateKind::AverageTime, false) => write!(
                f,
                "{} Average time {:.2}s exceeds maximum {:.2}s",
                mark, self.measured, self.threshold
            ),
            (GateKind::AverageTime, true) => write!(
                f,
                "{} Average time {:.2}s within maximum {:.2}s",
                mark, self.measured, self.threshold
            ),
        }
    }
}

/// Measured aggregate and the outcome of every configured gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// All configured gates passed
    pub passed: bool,
    pub success_rate: f64,
    #[serde(with = "seconds")]
    pub avg_time: Duration,
    pub total: usize,
    pub successful: usize,
    pub gates: Vec<GateOutcome>,
}

impl Judgment {
    /// Outcome of a gate, if it was configured
    pub fn gate(&self, kind: GateKind) -> Option<&GateOutcome> {
        self.gates.iter().find(|gate| gate.kind == kind)
    }

    /// Gates that did not pass
    pub fn failed_gates(&self) -> impl Iterator<Item = &GateOutcome> {
        self.gates.iter().filter(|gate| !gate.passed)
    }
}

/// Verdict over a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Nothing was executed, so nothing can be judged
    NoResults,
    /// The result set was measured against the criteria
    Judged(Judgment),
}

impl Verdict {
    /// Judged and every gate passed
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Judged(judgment) if judgment.passed)
    }

    /// The judgment, unless there were no results
    pub fn judgment(&self) -> Option<&Judgment> {
        match self {
            Verdict::Judged(judgment) => Some(judgment),
            Verdict::NoResults => None,
        }
    }
}

impl PassingCriteria {
    /// Measure `results` against these criteria.
    ///
    /// The overall verdict passes only when every configured gate passes.
    pub fn judge(&self, results: &[TestResult]) -> Verdict {
        if results.is_empty() {
            return Verdict::NoResults;
        }

        let total = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        let success_rate = successful as f64 / total as f64;
        let avg_time = results
            .iter()
            .map(|r| r.execution_time)
            .sum::<Duration>()
            .div_f64(total as f64);

        let mut gates = vec![GateOutcome {
            kind: GateKind::SuccessRate,
            passed: success_rate >= self.min_success_rate,
            measured: success_rate,
            threshold: self.min_success_rate,
        }];

        if let Some(max) = self.max_average_time {
            gates.push(GateOutcome {
                kind: GateKind::AverageTime,
                passed: avg_time <= max,
                measured: avg_time.as_secs_f64(),
                threshold: max.as_secs_f64(),
            });
        }

        Verdict::Judged(Judgment {
            passed: gates.iter().all(|gate| gate.passed),
            success_rate,
            avg_time,
            total,
            successful,
            gates,
        })
    }
}
