//! Test harness for chatbot implementations
//!
//! A [`TestSuite`] lists questions with the keywords a good answer contains.
//! The [`ChatbotEvaluator`] asks them in order, repeats the whole sequence as
//! often as the suite says, and judges the results against the suite's
//! [`PassingCriteria`].
//!
//! # Resets
//!
//! The chatbot is reset before the first case of every repetition, before
//! every case with `reset_before_run` set, and once after the run. Cases that
//! keep state see the conversation of the cases before them, which is how
//! multi-turn behavior is graded.
//!
//! # Example
//!
//! ```rust,ignore
//! use parley_core::testing::{ChatbotEvaluator, PassingCriteria, TestCase, TestSuite};
//!
//! let suite = TestSuite::new(
//!     vec![
//!         TestCase::new("capital", "What is the capital of Romania?").with_keywords(["Bucharest"]),
//!         TestCase::new("follow_up", "What was my last question?")
//!             .with_keywords(["capital", "Romania"])
//!             .keep_state(),
//!     ],
//!     PassingCriteria::new(0.8),
//! );
//!
//! let outcome = ChatbotEvaluator::new(chatbot).run_test_suite(&suite).await?;
//! if let Some(report) = outcome.report() {
//!     println!("{}", report.summary());
//! }
//! ```

mod evaluator;
mod judgment;
mod report;
mod reporter;
mod result;
mod seconds;
mod suite;

pub use evaluator::ChatbotEvaluator;
pub use judgment::{GateKind, GateOutcome, Judgment, Verdict};
pub use report::{EvalOutcome, EvalReport, RunSummary, TestTally};
pub use reporter::{EvalReporter, NoopReporter, TracingReporter};
pub use result::{CaseMetrics, KeywordMatch, TestResult};
pub use suite::{PassingCriteria, TestCase, TestSuite};

#[cfg(test)]
mod tests;
