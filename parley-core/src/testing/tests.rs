//! Evaluator behavior tests

use super::*;
use crate::chatbot::ChatBot;
use crate::context::ChatContext;
use crate::error::{ParleyError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Chatbot answering from a script and recording every call
#[derive(Default)]
struct ScriptedBot {
    answers: HashMap<String, String>,
    failing: Vec<String>,
    delay: Duration,
    fail_reset: AtomicBool,
    fail_reset_after: Option<usize>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBot {
    fn new() -> Self {
        Self::default()
    }

    fn answer(mut self, question: &str, answer: &str) -> Self {
        self.answers.insert(question.to_string(), answer.to_string());
        self
    }

    fn failing_on(mut self, question: &str) -> Self {
        self.failing.push(question.to_string());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn reset_count(&self) -> usize {
        self.calls().iter().filter(|c| *c == "reset").count()
    }
}

#[async_trait]
impl ChatBot for ScriptedBot {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn reset(&self) -> Result<()> {
        let resets = {
            let mut calls = self.calls.lock().unwrap();
            calls.push("reset".to_string());
            calls.iter().filter(|c| *c == "reset").count()
        };
        if self.fail_reset.load(Ordering::SeqCst) {
            return Err(ParleyError::Chatbot("state store offline".to_string()));
        }
        if self.fail_reset_after.is_some_and(|limit| resets > limit) {
            return Err(ParleyError::Chatbot("state store offline".to_string()));
        }
        Ok(())
    }

    async fn get_answer(&self, question: &str, ctx: &ChatContext) -> Result<String> {
        self.calls.lock().unwrap().push(question.to_string());
        ctx.update_status(&format!("thinking about {}", question));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.iter().any(|q| q == question) {
            return Err(ParleyError::Llm("model unavailable".to_string()));
        }
        Ok(self
            .answers
            .get(question)
            .cloned()
            .unwrap_or_else(|| format!("You asked: {}", question)))
    }
}

/// Reporter recording every callback as a line
#[derive(Default)]
struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl EvalReporter for RecordingReporter {
    fn run_started(&self, chatbot: &str, _suite: &TestSuite) {
        self.lines.lock().unwrap().push(format!("run {}", chatbot));
    }

    fn case_started(&self, case: &TestCase, repetition: u32, repetitions: u32) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("start {} {}/{}", case.id, repetition, repetitions));
    }

    fn status(&self, test_id: &str, text: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("status {} {}", test_id, text));
    }

    fn case_finished(&self, case: &TestCase, result: &TestResult) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("finish {} {}", case.id, result.success));
    }

    fn run_finished(&self, report: &EvalReport) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("done {}", report.passed()));
    }
}

fn three_cases() -> Vec<TestCase> {
    vec![
        TestCase::new("a", "first"),
        TestCase::new("b", "second"),
        TestCase::new("c", "third"),
    ]
}

async fn run(bot: Arc<ScriptedBot>, suite: &TestSuite) -> EvalReport {
    ChatbotEvaluator::new(bot)
        .run_test_suite(suite)
        .await
        .unwrap()
        .into_report()
        .expect("suite should run")
}

#[tokio::test]
async fn results_follow_repetition_major_order() {
    let bot = Arc::new(ScriptedBot::new());
    let suite = TestSuite::new(three_cases(), PassingCriteria::default()).with_repetitions(2);

    let report = run(bot.clone(), &suite).await;

    let order: Vec<(u32, &str)> = report
        .results
        .iter()
        .map(|r| (r.repetition, r.test_id.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![(1, "a"), (1, "b"), (1, "c"), (2, "a"), (2, "b"), (2, "c")]
    );
    assert_eq!(report.repetitions, 2);
    assert!(report.passed());
}

#[tokio::test]
async fn first_case_of_each_repetition_resets() {
    let bot = Arc::new(ScriptedBot::new());
    let cases = vec![
        TestCase::new("a", "first").keep_state(),
        TestCase::new("b", "second").keep_state(),
    ];
    let suite = TestSuite::new(cases, PassingCriteria::default()).with_repetitions(3);

    run(bot.clone(), &suite).await;

    // one forced reset per repetition plus the final cleanup
    assert_eq!(bot.reset_count(), 4);
    assert_eq!(
        bot.calls(),
        vec![
            "reset", "first", "second", "reset", "first", "second", "reset", "first", "second",
            "reset"
        ]
    );
}

#[tokio::test]
async fn reset_before_each_case_by_default() {
    let bot = Arc::new(ScriptedBot::new());
    let suite = TestSuite::new(three_cases(), PassingCriteria::default());

    run(bot.clone(), &suite).await;

    assert_eq!(
        bot.calls(),
        vec!["reset", "first", "reset", "second", "reset", "third", "reset"]
    );
}

#[tokio::test]
async fn missing_keyword_downgrades_success() {
    let bot = Arc::new(ScriptedBot::new().answer("Capital of Germany?", "Paris"));
    let suite = TestSuite::new(
        vec![TestCase::new("capital", "Capital of Germany?").with_keywords(["Berlin"])],
        PassingCriteria::default(),
    );

    let report = run(bot, &suite).await;
    let result = &report.results[0];

    assert!(!result.success);
    assert_eq!(result.answer.as_deref(), Some("Paris"));
    assert_eq!(result.keyword_score(), Some(0.0));
    assert_eq!(result.error.as_deref(), Some("Keywords missing: expected 1, found 0"));
}

#[tokio::test]
async fn full_keyword_match_succeeds() {
    let bot = Arc::new(ScriptedBot::new().answer("Capital of Germany?", "It is berlin."));
    let suite = TestSuite::new(
        vec![TestCase::new("capital", "Capital of Germany?").with_keywords(["Berlin"])],
        PassingCriteria::default(),
    );

    let report = run(bot, &suite).await;
    let result = &report.results[0];

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(result.keyword_score(), Some(1.0));
    assert_eq!(result.answer_length, "It is berlin.".chars().count());
    assert_eq!(
        result.metrics.keyword_match.as_ref().unwrap().found,
        vec!["Berlin"]
    );
}

#[tokio::test]
async fn partial_keywords_report_counts() {
    let bot = Arc::new(ScriptedBot::new().answer("Last question?", "You asked about the capital."));
    let suite = TestSuite::new(
        vec![TestCase::new("recall", "Last question?").with_keywords(["capital", "Romania"])],
        PassingCriteria::default(),
    );

    let report = run(bot, &suite).await;
    let result = &report.results[0];

    assert!(!result.success);
    assert_eq!(result.keyword_score(), Some(0.5));
    assert_eq!(result.error.as_deref(), Some("Keywords missing: expected 2, found 1"));
}

#[tokio::test]
async fn empty_answer_is_not_scored() {
    let bot = Arc::new(ScriptedBot::new().answer("Say nothing", ""));
    let suite = TestSuite::new(
        vec![TestCase::new("silent", "Say nothing").with_keywords(["anything"])],
        PassingCriteria::default(),
    );

    let report = run(bot, &suite).await;
    let result = &report.results[0];

    assert!(result.success);
    assert_eq!(result.answer_length, 0);
    assert!(result.metrics.keyword_match.is_none());
}

#[tokio::test]
async fn success_rate_gate_follows_criteria() {
    let mut bot = ScriptedBot::new();
    let mut cases = Vec::new();
    for i in 0..10 {
        let question = format!("question {}", i);
        if i >= 7 {
            bot = bot.failing_on(&question);
        }
        cases.push(TestCase::new(format!("q{}", i), question));
    }
    let bot = Arc::new(bot);

    let strict = TestSuite::new(cases.clone(), PassingCriteria::new(0.8));
    let report = run(bot.clone(), &strict).await;
    assert!(!report.passed());
    let gate = report
        .verdict
        .judgment()
        .unwrap()
        .gate(GateKind::SuccessRate)
        .unwrap()
        .clone();
    assert!(!gate.passed);
    assert!((gate.measured - 0.7).abs() < 1e-9);

    let lenient = TestSuite::new(cases, PassingCriteria::new(0.7));
    assert!(run(bot, &lenient).await.passed());
}

#[tokio::test(start_paused = true)]
async fn latency_gate_fails_on_its_own() {
    let bot = Arc::new(ScriptedBot::new().with_delay(Duration::from_secs(5)));
    let suite = TestSuite::new(
        vec![TestCase::new("slow", "take your time")],
        PassingCriteria::new(1.0).with_max_average_time(Duration::from_secs(4)),
    );

    let report = run(bot, &suite).await;
    let judgment = report.verdict.judgment().unwrap();

    assert!(report.results[0].success);
    assert!(report.results[0].execution_time >= Duration::from_secs(5));
    assert!(judgment.gate(GateKind::SuccessRate).unwrap().passed);
    assert!(!judgment.gate(GateKind::AverageTime).unwrap().passed);
    assert!(!report.passed());
}

#[tokio::test]
async fn empty_suite_is_a_no_op() {
    let bot = Arc::new(ScriptedBot::new());

    let empty = TestSuite::new(Vec::new(), PassingCriteria::default());
    let outcome = ChatbotEvaluator::new(bot.clone())
        .run_test_suite(&empty)
        .await
        .unwrap();
    assert_eq!(outcome, EvalOutcome::NothingToRun);

    let zero = TestSuite::new(three_cases(), PassingCriteria::default()).with_repetitions(0);
    let outcome = ChatbotEvaluator::new(bot.clone())
        .run_test_suite(&zero)
        .await
        .unwrap();
    assert_eq!(outcome, EvalOutcome::NothingToRun);

    assert!(bot.calls().is_empty());
}

#[tokio::test]
async fn failing_case_does_not_stop_the_run() {
    let bot = Arc::new(ScriptedBot::new().failing_on("second"));
    let suite = TestSuite::new(three_cases(), PassingCriteria::new(0.5));

    let report = run(bot.clone(), &suite).await;

    assert_eq!(report.results.len(), 3);
    let failed = &report.results[1];
    assert!(!failed.success);
    assert!(failed.answer.is_none());
    assert_eq!(failed.answer_length, 0);
    assert!(failed.error.as_deref().unwrap().contains("model unavailable"));
    assert!(report.results[2].success);
    assert!(bot.calls().contains(&"third".to_string()));
}

#[tokio::test]
async fn reset_failure_before_case_aborts() {
    let bot = ScriptedBot::new();
    bot.fail_reset.store(true, Ordering::SeqCst);
    let bot = Arc::new(bot);
    let suite = TestSuite::new(three_cases(), PassingCriteria::default());

    let err = ChatbotEvaluator::new(bot.clone())
        .run_test_suite(&suite)
        .await
        .unwrap_err();

    assert!(matches!(err, ParleyError::Reset(_)));
    assert!(err.to_string().contains("'a'"));
    assert!(!bot.calls().contains(&"first".to_string()));
}

#[tokio::test]
async fn final_reset_failure_is_kept_on_report() {
    let bot = ScriptedBot {
        fail_reset_after: Some(1),
        ..ScriptedBot::default()
    };
    let bot = Arc::new(bot);
    let suite = TestSuite::new(
        vec![
            TestCase::new("a", "first"),
            TestCase::new("b", "second").keep_state(),
        ],
        PassingCriteria::default(),
    );

    let report = run(bot, &suite).await;

    assert!(report.passed());
    assert!(report
        .cleanup_error
        .as_deref()
        .unwrap()
        .contains("state store offline"));
}

#[tokio::test(start_paused = true)]
async fn answer_timeout_fails_case_and_continues() {
    let bot = Arc::new(ScriptedBot::new().with_delay(Duration::from_secs(10)));
    let suite = TestSuite::new(
        vec![TestCase::new("a", "first"), TestCase::new("b", "second")],
        PassingCriteria::default(),
    );

    let outcome = ChatbotEvaluator::new(bot)
        .with_answer_timeout(Some(Duration::from_secs(2)))
        .run_test_suite(&suite)
        .await
        .unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.results.len(), 2);
    for result in &report.results {
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Timed out after 2.0s"));
    }
}

#[tokio::test]
async fn reporter_sees_progress_in_order() {
    let bot = Arc::new(ScriptedBot::new());
    let reporter = Arc::new(RecordingReporter::default());
    let suite = TestSuite::new(vec![TestCase::new("a", "first")], PassingCriteria::default());

    ChatbotEvaluator::new(bot)
        .with_reporter(reporter.clone())
        .run_test_suite(&suite)
        .await
        .unwrap();

    assert_eq!(
        reporter.lines(),
        vec![
            "run scripted",
            "start a 1/1",
            "status a thinking about first",
            "finish a true",
            "done true",
        ]
    );
}

/// Chatbot that calls two tools at once and reports a result for a tool it never started
struct ToolBot;

#[async_trait]
impl ChatBot for ToolBot {
    fn name(&self) -> &str {
        "tools"
    }

    async fn get_answer(&self, _question: &str, ctx: &ChatContext) -> Result<String> {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        ctx.on_tool_start(first, Some("current_time"), "{}");
        ctx.on_tool_start(second, Some("convert_currency"), &"x".repeat(150));
        ctx.on_tool_end(second, "ok");
        ctx.on_tool_end(first, "12:00");
        ctx.on_tool_end(Uuid::new_v4(), "orphan");
        Ok("done".to_string())
    }
}

#[tokio::test]
async fn tool_narration_reaches_reporter() {
    let reporter = Arc::new(RecordingReporter::default());
    let suite = TestSuite::new(vec![TestCase::new("t", "what time")], PassingCriteria::default());

    ChatbotEvaluator::new(Arc::new(ToolBot))
        .with_reporter(reporter.clone())
        .run_test_suite(&suite)
        .await
        .unwrap();

    let statuses: Vec<String> = reporter
        .lines()
        .into_iter()
        .filter_map(|line| line.strip_prefix("status t ").map(str::to_string))
        .collect();
    assert_eq!(
        statuses,
        vec![
            "🔨 Calling current_time()".to_string(),
            format!("🔨 Calling convert_currency({}...[50 more])", "x".repeat(100)),
            "📦 convert_currency returned: ok".to_string(),
            "📦 current_time returned: 12:00".to_string(),
            "📦 tool returned: orphan".to_string(),
        ]
    );
}
