//! Presentation sinks for evaluation progress

use super::report::EvalReport;
use super::result::TestResult;
use super::suite::{TestCase, TestSuite};

/// Receives evaluation progress as it happens.
///
/// Every method has an empty default so sinks implement only what they show.
/// Calls arrive in execution order; `status` calls for a case arrive between
/// its `case_started` and `case_finished`.
pub trait EvalReporter: Send + Sync {
    /// The run is about to start
    fn run_started(&self, _chatbot: &str, _suite: &TestSuite) {}

    /// A case is about to be asked; `repetition` is 1-based
    fn case_started(&self, _case: &TestCase, _repetition: u32, _repetitions: u32) {}

    /// Narration published by the chatbot while answering `test_id`
    fn status(&self, _test_id: &str, _text: &str) {}

    /// A case finished and was scored
    fn case_finished(&self, _case: &TestCase, _result: &TestResult) {}

    /// All repetitions finished and the results were judged
    fn run_finished(&self, _report: &EvalReport) {}
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl EvalReporter for NoopReporter {}

/// Logs progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl EvalReporter for TracingReporter {
    fn run_started(&self, chatbot: &str, suite: &TestSuite) {
        tracing::info!(
            chatbot = %chatbot,
            cases = suite.len(),
            repetitions = suite.repetitions,
            total_runs = suite.total_runs(),
            "Running test suite"
        );
    }

    fn case_started(&self, case: &TestCase, repetition: u32, repetitions: u32) {
        tracing::info!(
            test_id = %case.id,
            repetition,
            repetitions,
            "Asking: {}",
            case.question
        );
    }

    fn status(&self, test_id: &str, text: &str) {
        tracing::debug!(test_id = %test_id, "{}", text);
    }

    fn case_finished(&self, _case: &TestCase, result: &TestResult) {
        let secs = result.execution_time.as_secs_f64();
        if result.success {
            tracing::info!(test_id = %result.test_id, secs, "Success");
        } else {
            tracing::warn!(
                test_id = %result.test_id,
                secs,
                error = result.error.as_deref().unwrap_or_default(),
                "Failed"
            );
        }
    }

    fn run_finished(&self, report: &EvalReport) {
        let summary = report.summary();
        if report.passed() {
            tracing::info!(chatbot = %report.chatbot, "{}; all criteria passed", summary);
        } else {
            tracing::warn!(chatbot = %report.chatbot, "{}; criteria not met", summary);
        }
    }
}
