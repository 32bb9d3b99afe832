//! Evaluation run reports

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::judgment::Verdict;
use super::result::TestResult;
use crate::error::Result;

/// What a suite run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvalOutcome {
    /// The suite had no test cases or zero repetitions
    NothingToRun,
    /// Every case ran in every repetition
    Completed(EvalReport),
}

impl EvalOutcome {
    /// The report, if anything ran
    pub fn report(&self) -> Option<&EvalReport> {
        match self {
            EvalOutcome::Completed(report) => Some(report),
            EvalOutcome::NothingToRun => None,
        }
    }

    /// Consume into the report, if anything ran
    pub fn into_report(self) -> Option<EvalReport> {
        match self {
            EvalOutcome::Completed(report) => Some(report),
            EvalOutcome::NothingToRun => None,
        }
    }
}

/// Results of a completed suite run and their verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Name of the evaluated chatbot
    pub chatbot: String,

    /// Repetitions run
    pub repetitions: u32,

    /// Results in execution order (repetition-major)
    pub results: Vec<TestResult>,

    pub verdict: Verdict,

    /// Failure of the reset that follows the last case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_error: Option<String>,
}

impl EvalReport {
    /// Whether the suite passed its criteria
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }

    /// Totals over all results
    pub fn summary(&self) -> RunSummary {
        let total = self.results.len();
        let successful = self.results.iter().filter(|r| r.success).count();
        let avg_time = if total == 0 {
            Duration::ZERO
        } else {
            self.results
                .iter()
                .map(|r| r.execution_time)
                .sum::<Duration>()
                .div_f64(total as f64)
        };
        RunSummary {
            successful,
            total,
            avg_time,
        }
    }

    /// Per-test pass counts across repetitions, in first-execution order
    pub fn tallies(&self) -> Vec<TestTally> {
        let mut tallies: Vec<TestTally> = Vec::new();
        for result in &self.results {
            let index = match tallies.iter().position(|t| t.test_id == result.test_id) {
                Some(index) => index,
                None => {
                    tallies.push(TestTally {
                        test_id: result.test_id.clone(),
                        passed: 0,
                        runs: 0,
                    });
                    tallies.len() - 1
                }
            };
            let tally = &mut tallies[index];
            tally.runs += 1;
            if result.success {
                tally.passed += 1;
            }
        }
        tallies
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Totals of one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub successful: usize,
    pub total: usize,
    pub avg_time: Duration,
}

impl RunSummary {
    /// Successful share in percent
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Results: {}/{} passed ({:.1}%) | Avg time: {:.2}s",
            self.successful,
            self.total,
            self.percentage(),
            self.avg_time.as_secs_f64()
        )
    }
}

/// How often one test passed across repetitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTally {
    pub test_id: String,
    pub passed: usize,
    pub runs: usize,
}

impl fmt::Display for TestTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percentage = if self.runs == 0 {
            0.0
        } else {
            self.passed as f64 / self.runs as f64 * 100.0
        };
        write!(
            f,
            "{} → {}/{} runs passed ({:.0}%)",
            self.test_id, self.passed, self.runs, percentage
        )
    }
}
