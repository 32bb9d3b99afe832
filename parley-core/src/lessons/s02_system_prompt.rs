//! Lesson 2: system prompt
//!
//! A fixed system message is sent ahead of every question and shapes the
//! assistant's tone.

use std::sync::Arc;

use async_trait::async_trait;

use crate::chatbot::ChatBot;
use crate::context::ChatContext;
use crate::error::Result;
use crate::llm::{LlmProvider, LlmRequest, Message, observed_answer};
use crate::testing::{PassingCriteria, TestCase, TestSuite};

pub const NAME: &str = "s02_system_prompt";
pub const DESCRIPTION: &str = "Answers in a bubbly voice set by a system prompt";

/// Instructions used unless the configuration overrides them
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a bubbly, cheerful assistant. \
Answer concisely and correctly, and let your upbeat personality shine through. \
When asked about yourself, describe your personality as bubbly.";

/// Sends a system prompt ahead of each question
pub struct SystemPromptBot {
    llm: Arc<dyn LlmProvider>,
    system_prompt: String,
}

impl SystemPromptBot {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the default instructions
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[async_trait]
impl ChatBot for SystemPromptBot {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn get_answer(&self, question: &str, ctx: &ChatContext) -> Result<String> {
        ctx.update_status("🧠 Thinking...");
        let request = LlmRequest::new(vec![
            Message::system(self.system_prompt.as_str()),
            Message::user(question),
        ]);
        let response = observed_answer(self.llm.as_ref(), &request, ctx).await?;
        Ok(response.content)
    }
}

pub fn test_suite() -> TestSuite {
    TestSuite::new(
        vec![
            TestCase::new("simple_factual", "What is the capital of France?")
                .with_keywords(["Paris"]),
            TestCase::new("explanation", "Explain what Python is in one sentence")
                .with_keywords(["programming"]),
            TestCase::new("system_prompt_adherence", "Tell me about your personality")
                .with_keywords(["bubbly"]),
        ],
        PassingCriteria::new(0.8),
    )
    .with_name("System prompt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;
    use std::sync::Mutex;

    /// Records the requests it receives
    #[derive(Default)]
    struct CapturingProvider {
        requests: Mutex<Vec<LlmRequest>>,
    }

    #[async_trait]
    impl LlmProvider for CapturingProvider {
        fn model_name(&self) -> &str {
            "capturing"
        }

        async fn answer(&self, request: &LlmRequest) -> Result<Message> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(Message::assistant("ok"))
        }
    }

    #[tokio::test]
    async fn test_system_prompt_leads_request() {
        let llm = Arc::new(CapturingProvider::default());
        let bot = SystemPromptBot::new(llm.clone());

        bot.get_answer("Hi!", &ChatContext::silent()).await.unwrap();

        let requests = llm.requests.lock().unwrap();
        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(messages[1].content, "Hi!");
    }

    #[tokio::test]
    async fn test_prompt_override() {
        let llm = Arc::new(CapturingProvider::default());
        let bot = SystemPromptBot::new(llm.clone()).with_system_prompt("Be terse.");
        assert_eq!(bot.system_prompt(), "Be terse.");

        bot.get_answer("Hi!", &ChatContext::silent()).await.unwrap();
        assert_eq!(llm.requests.lock().unwrap()[0].messages[0].content, "Be terse.");
    }
}
