//! Terminal rendering of evaluation progress and live answers

use std::io::Write;
use std::time::Duration;

use colored::Colorize;
use parley_core::live::{LiveRenderer, OutcomeState, status_label};
use parley_core::testing::{EvalReport, EvalReporter, TestCase, TestResult, TestSuite, Verdict};

/// Longest question prefix shown next to a test id
const QUESTION_PREVIEW: usize = 50;

fn preview(question: &str) -> String {
    question.chars().take(QUESTION_PREVIEW).collect()
}

/// Prints evaluation progress to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    /// Show chatbot narration under each case
    pub show_status: bool,
}

impl EvalReporter for ConsoleReporter {
    fn run_started(&self, chatbot: &str, suite: &TestSuite) {
        let title = suite.name.as_deref().unwrap_or(chatbot);
        println!("{}", title.cyan().bold());
        if suite.repetitions > 1 {
            println!(
                "Running {} test cases × {} repetitions = {} total runs...",
                suite.len(),
                suite.repetitions,
                suite.total_runs()
            );
        } else {
            println!("Running {} test cases...", suite.len());
        }
        println!();
    }

    fn case_started(&self, case: &TestCase, repetition: u32, repetitions: u32) {
        let label = format!("[{}]", case.id).bold();
        if repetitions > 1 {
            println!(
                "{} {} (run {}/{})",
                label,
                preview(&case.question),
                repetition,
                repetitions
            );
        } else {
            println!("{} {}", label, preview(&case.question));
        }
    }

    fn status(&self, _test_id: &str, text: &str) {
        if self.show_status {
            println!("    {}", text.dimmed());
        }
    }

    fn case_finished(&self, _case: &TestCase, result: &TestResult) {
        let secs = result.execution_time.as_secs_f64();
        if result.success {
            println!("  {} ({:.2}s)", "✔️  Success".green(), secs);
            if let Some(keywords) = &result.metrics.keyword_match {
                println!(
                    "    Keywords: {:?} ({:.0}%)",
                    keywords.found,
                    keywords.score * 100.0
                );
            }
        } else {
            println!(
                "  {} {}",
                "❌ Failed:".red(),
                result.error.as_deref().unwrap_or_default()
            );
        }
    }

    fn run_finished(&self, report: &EvalReport) {
        println!();
        if report.repetitions > 1 {
            for tally in report.tallies() {
                println!("  {}", tally);
            }
            println!();
        }

        println!("{}", report.summary().to_string().bold());
        match &report.verdict {
            Verdict::NoResults => println!("No results to check"),
            Verdict::Judged(judgment) => {
                for gate in judgment.failed_gates() {
                    println!("{}", gate.to_string().red());
                }
                if judgment.passed {
                    println!("{}", "✔️  All criteria passed".green().bold());
                }
            }
        }
        if let Some(error) = &report.cleanup_error {
            println!("{} {}", "⚠️  Final reset failed:".yellow(), error);
        }
    }
}

/// Renders a live answer: narration lines above a refreshing status label
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    label_shown: bool,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_label(&mut self) {
        if self.label_shown {
            print!("\r\x1b[2K");
            self.label_shown = false;
        }
    }

    fn show_label(&mut self, label: String) {
        print!("\r\x1b[2K{}", label);
        let _ = std::io::stdout().flush();
        self.label_shown = true;
    }
}

impl LiveRenderer for ConsoleRenderer {
    fn on_status(&mut self, text: &str) {
        self.clear_label();
        println!("{}", text.dimmed());
    }

    fn on_tick(&mut self, elapsed: Duration) {
        self.show_label(status_label(None, elapsed).yellow().to_string());
    }

    fn on_outcome(&mut self, state: OutcomeState, elapsed: Duration) {
        let label = status_label(Some(state), elapsed);
        let label = match state {
            OutcomeState::Complete => label.green(),
            OutcomeState::Error => label.red(),
        };
        self.show_label(label.to_string());
        println!();
        self.label_shown = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_char_based() {
        let question = "ä".repeat(60);
        assert_eq!(preview(&question).chars().count(), QUESTION_PREVIEW);
        assert_eq!(preview("short"), "short");
    }
}
