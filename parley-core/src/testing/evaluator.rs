//! Execution engine for test suites

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use super::judgment::Verdict;
use super::report::{EvalOutcome, EvalReport};
use super::reporter::{EvalReporter, NoopReporter};
use super::result::{CaseMetrics, KeywordMatch, TestResult};
use super::suite::{TestCase, TestSuite};
use crate::chatbot::ChatBot;
use crate::config::EvalConfig;
use crate::context::ChatContext;
use crate::error::{ParleyError, Result};

/// Runs test suites against one chatbot.
///
/// Cases run strictly one after another. A failing answer is recorded and the
/// run moves on; only a failing reset before a case aborts the run.
pub struct ChatbotEvaluator {
    chatbot: Arc<dyn ChatBot>,
    reporter: Arc<dyn EvalReporter>,
    answer_timeout: Option<Duration>,
    verbose: bool,
}

impl ChatbotEvaluator {
    /// Create an evaluator that reports nowhere
    pub fn new(chatbot: Arc<dyn ChatBot>) -> Self {
        Self {
            chatbot,
            reporter: Arc::new(NoopReporter),
            answer_timeout: None,
            verbose: false,
        }
    }

    /// Send progress to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn EvalReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Apply evaluation settings
    pub fn with_config(mut self, config: &EvalConfig) -> Self {
        self.answer_timeout = config.answer_timeout;
        self
    }

    /// Fail answers that take longer than `timeout`
    pub fn with_answer_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.answer_timeout = timeout;
        self
    }

    /// Narrate model transcripts through the status channel
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The chatbot under test
    pub fn chatbot(&self) -> &Arc<dyn ChatBot> {
        &self.chatbot
    }

    /// Run every case of `suite` in every repetition and judge the results.
    ///
    /// The chatbot is reset before the first case of each repetition and
    /// before every case that asks for it, then once more after the last case.
    ///
    /// # Errors
    ///
    /// Returns [`ParleyError::Reset`] if the chatbot cannot be reset before a
    /// case. Answer failures never abort the run.
    pub async fn run_test_suite(&self, suite: &TestSuite) -> Result<EvalOutcome> {
        if suite.is_empty() || suite.repetitions == 0 {
            tracing::info!(chatbot = %self.chatbot.name(), "Nothing to run");
            return Ok(EvalOutcome::NothingToRun);
        }

        if let Err(e) = suite.validate() {
            tracing::warn!(error = %e, "Running suite that failed validation");
        }

        let name = self.chatbot.name().to_string();
        self.reporter.run_started(&name, suite);

        let mut results = Vec::with_capacity(suite.total_runs());
        for repetition in 1..=suite.repetitions {
            for (index, case) in suite.test_cases.iter().enumerate() {
                if index == 0 || case.reset_before_run {
                    self.chatbot.reset().await.map_err(|e| {
                        ParleyError::Reset(format!(
                            "before '{}' (repetition {}/{}): {}",
                            case.id, repetition, suite.repetitions, e
                        ))
                    })?;
                }

                self.reporter.case_started(case, repetition, suite.repetitions);
                let result = self.run_test_case(case, repetition).await;
                self.reporter.case_finished(case, &result);
                results.push(result);
            }
        }

        let cleanup_error = match self.chatbot.reset().await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(chatbot = %name, error = %e, "Final reset failed");
                Some(e.to_string())
            }
        };

        let verdict = suite.passing_criteria.judge(&results);
        if let Verdict::Judged(judgment) = &verdict {
            for gate in &judgment.gates {
                tracing::debug!(chatbot = %name, "{}", gate);
            }
        }

        let report = EvalReport {
            chatbot: name,
            repetitions: suite.repetitions,
            results,
            verdict,
            cleanup_error,
        };
        self.reporter.run_finished(&report);

        Ok(EvalOutcome::Completed(report))
    }

    /// Ask a single case and score the answer.
    ///
    /// Does not reset the chatbot.
    pub async fn run_test_case(&self, case: &TestCase, repetition: u32) -> TestResult {
        let started_at = Utc::now();
        let ctx = self.status_context(&case.id);

        let start = Instant::now();
        let outcome = self.ask(&case.question, &ctx).await;
        let execution_time = start.elapsed();

        let (answer, mut success, mut error) = match outcome {
            Ok(answer) => (Some(answer), true, None),
            Err(e) => {
                tracing::debug!(test_id = %case.id, error = %e, "Chatbot failed");
                (None, false, Some(e.to_string()))
            }
        };

        let mut metrics = CaseMetrics::default();
        if let Some(text) = answer.as_deref() {
            if success && !text.is_empty() && !case.expected_keywords.is_empty() {
                let keyword_match = KeywordMatch::compute(&case.expected_keywords, text);
                if !keyword_match.is_complete() {
                    success = false;
                    error = Some(format!(
                        "Keywords missing: expected {}, found {}",
                        keyword_match.total,
                        keyword_match.found.len()
                    ));
                }
                metrics.keyword_match = Some(keyword_match);
            }
        }

        TestResult {
            test_id: case.id.clone(),
            question: case.question.clone(),
            answer_length: answer.as_deref().map_or(0, |a| a.chars().count()),
            answer,
            success,
            error,
            execution_time,
            repetition,
            metrics,
            started_at,
        }
    }

    async fn ask(&self, question: &str, ctx: &ChatContext) -> Result<String> {
        let answer = self.chatbot.get_answer(question, ctx);
        match self.answer_timeout {
            Some(limit) => tokio::time::timeout(limit, answer)
                .await
                .map_err(|_| ParleyError::Timeout(limit))?,
            None => answer.await,
        }
    }

    fn status_context(&self, test_id: &str) -> ChatContext {
        let reporter = Arc::clone(&self.reporter);
        let test_id = test_id.to_string();
        ChatContext::new(move |text| reporter.status(&test_id, text)).with_verbose(self.verbose)
    }
}
