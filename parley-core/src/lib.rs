//! # Parley - lesson chatbots and the harness that grades them
//!
//! Parley is an educational framework for building conversational assistants
//! with progressively richer capabilities:
//! - Plain prompting and system instructions
//! - Multi-turn conversation history
//! - Tool calling with concurrently executed tools
//! - Keyword-graded test suites with success rate and latency gates
//! - Live status narration while an answer is being produced
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parley_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ParleyConfig::load()?;
//!     let llm = Arc::new(lessons::offline_provider(&config.llm)?);
//!     let registry = lessons::default_registry(llm, &config.chat)?;
//!
//!     let chatbot = registry.load("s01_prompting")?;
//!     if let Some(suite) = registry.test_suite("s01_prompting")? {
//!         let outcome = ChatbotEvaluator::new(chatbot).run_test_suite(&suite).await?;
//!         if let Some(report) = outcome.report() {
//!             println!("{}", report.summary());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **chatbot**: the [`chatbot::ChatBot`] capability and the registry of lessons
//! - **context**: the status channel chatbots narrate through
//! - **testing**: suites, the evaluator and the pass/fail judgment
//! - **live**: background answers with heartbeat ticks for interactive front-ends
//! - **llm** and **tools**: what lessons build on

pub mod chatbot;
pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod lessons;
pub mod live;
pub mod llm;
pub mod logging;
pub mod testing;
pub mod tools;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chatbot::{ChatBot, ChatBotEntry, ChatBotRegistry};
    pub use crate::config::{
        ChatConfig, ConfigBuilder, EvalConfig, LlmConfig, LoggingConfig, ParleyConfig,
    };
    pub use crate::context::ChatContext;
    pub use crate::conversation::ChatHistory;
    pub use crate::error::{ParleyError, Result};
    pub use crate::lessons;
    pub use crate::live::{
        LiveAnswer, LiveOptions, LiveRenderer, LiveSession, OutcomeState, StatusEvent,
        status_label,
    };
    pub use crate::llm::{
        LlmProvider, LlmRequest, Message, MessageRole, StubProvider, StubRule, ToolCall, ToolSpec,
    };
    pub use crate::testing::{
        ChatbotEvaluator, EvalOutcome, EvalReport, EvalReporter, GateKind, Judgment,
        PassingCriteria, TestCase, TestResult, TestSuite, TracingReporter, Verdict,
    };
    pub use crate::tools::{Tool, ToolSet};
}
