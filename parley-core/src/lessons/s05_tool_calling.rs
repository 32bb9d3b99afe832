//! Lesson 5: tool calling
//!
//! The model is offered a clock and a currency converter. When it asks for
//! tools, the calls run concurrently and their results go back to the model,
//! until it answers in text or the round limit is reached.

use std::sync::Arc;

use async_trait::async_trait;

use crate::chatbot::ChatBot;
use crate::context::ChatContext;
use crate::error::{ParleyError, Result};
use crate::llm::{LlmProvider, LlmRequest, Message, observed_answer};
use crate::testing::{PassingCriteria, TestCase, TestSuite};
use crate::tools::{ConvertCurrencyTool, CurrentTimeTool, ToolSet};

pub const NAME: &str = "s05_tool_calling";
pub const DESCRIPTION: &str = "Looks up the time and converts currencies with tools";

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the available tools for \
the current time and for currency conversions instead of guessing.";

const DEFAULT_MAX_ROUNDS: usize = 5;

/// Answers with the help of tools
pub struct ToolCallingBot {
    llm: Arc<dyn LlmProvider>,
    tools: ToolSet,
    max_rounds: usize,
}

impl ToolCallingBot {
    /// Create the bot with the lesson's tools
    pub fn new(llm: Arc<dyn LlmProvider>) -> Result<Self> {
        let tools = ToolSet::new()
            .with_tool(CurrentTimeTool::new())?
            .with_tool(ConvertCurrencyTool::new())?;
        Ok(Self::with_tools(llm, tools))
    }

    /// Create the bot with a custom tool set
    pub fn with_tools(llm: Arc<dyn LlmProvider>, tools: ToolSet) -> Self {
        Self {
            llm,
            tools,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Limit the number of model calls per question
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }
}

#[async_trait]
impl ChatBot for ToolCallingBot {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn get_answer(&self, question: &str, ctx: &ChatContext) -> Result<String> {
        ctx.update_status("🧠 Thinking...");

        let mut messages = vec![Message::system(SYSTEM_PROMPT), Message::user(question)];
        for round in 1..=self.max_rounds {
            let request = LlmRequest::new(messages.clone()).with_tools(self.tools.specs());
            let response = observed_answer(self.llm.as_ref(), &request, ctx).await?;

            if !response.has_tool_calls() {
                return Ok(response.content);
            }

            tracing::debug!(round, calls = response.tool_calls.len(), "Model requested tools");
            let results = self.tools.execute_all(&response.tool_calls, ctx).await;
            messages.push(response);
            messages.extend(results);
        }

        Err(ParleyError::Chatbot(format!(
            "No answer after {} tool rounds",
            self.max_rounds
        )))
    }
}

pub fn test_suite() -> TestSuite {
    TestSuite::new(
        vec![
            TestCase::new("current_time", "What time is it right now?").with_keywords(["UTC"]),
            TestCase::new("currency_conversion", "How much is 10 EUR in USD?")
                .with_keywords(["EUR", "USD"]),
            TestCase::new("no_tool_needed", "What is the capital of France?")
                .with_keywords(["Paris"]),
        ],
        PassingCriteria::new(0.8),
    )
    .with_name("Tool calling")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{StubProvider, StubRule};
    use serde_json::json;
    use std::sync::Mutex;

    fn recording_context() -> (ChatContext, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let ctx = ChatContext::new(move |text| sink.lock().unwrap().push(text.to_string()));
        (ctx, lines)
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let llm = Arc::new(StubProvider::new("?").with_rule(
            StubRule::new("eur", "That is {tool_results}.")
                .with_tool_call("convert_currency", json!({"amount": 100, "from": "USD", "to": "EUR"})),
        ));
        let bot = ToolCallingBot::new(llm.clone()).unwrap();
        let (ctx, lines) = recording_context();

        let answer = bot.get_answer("100 USD in EUR?", &ctx).await.unwrap();

        assert_eq!(answer, "That is 100.00 USD = 92.00 EUR.");
        assert_eq!(llm.call_count(), 2);
        let lines = lines.lock().unwrap();
        assert_eq!(
            lines[1],
            r#"🔨 Calling convert_currency("amount":100,"from":"USD","to":"EUR")"#
        );
        assert_eq!(lines[2], "📦 convert_currency returned: 100.00 USD = 92.00 EUR");
    }

    #[tokio::test]
    async fn test_answers_without_tools() {
        let llm = Arc::new(StubProvider::new("Paris"));
        let bot = ToolCallingBot::new(llm.clone()).unwrap();

        let answer = bot.get_answer("Capital of France?", &ChatContext::silent()).await.unwrap();
        assert_eq!(answer, "Paris");
        assert_eq!(llm.call_count(), 1);
    }

    /// Asks for the clock forever
    struct LoopingProvider;

    #[async_trait]
    impl LlmProvider for LoopingProvider {
        fn model_name(&self) -> &str {
            "looping"
        }

        async fn answer(&self, _request: &LlmRequest) -> Result<Message> {
            Ok(Message::tool_request(vec![crate::llm::ToolCall {
                id: "again".to_string(),
                name: "current_time".to_string(),
                arguments: json!({}),
            }]))
        }
    }

    #[tokio::test]
    async fn test_round_limit() {
        let bot = ToolCallingBot::new(Arc::new(LoopingProvider))
            .unwrap()
            .with_max_rounds(3);
        let (ctx, lines) = recording_context();

        let err = bot.get_answer("time?", &ctx).await.unwrap_err();
        assert!(err.to_string().contains("No answer after 3 tool rounds"));
        // thinking plus start and end of one call per round
        assert_eq!(lines.lock().unwrap().len(), 7);
    }

    #[test]
    fn test_offers_lesson_tools() {
        let bot = ToolCallingBot::new(Arc::new(StubProvider::new("?"))).unwrap();
        assert_eq!(bot.tools().names(), vec!["current_time", "convert_currency"]);
    }
}
