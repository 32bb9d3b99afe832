//! Lesson 3: conversation history
//!
//! Earlier turns are sent along with every question so follow-ups like
//! "what was my previous question?" can be answered. [`ChatBot::reset`]
//! forgets them.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::chatbot::ChatBot;
use crate::context::ChatContext;
use crate::conversation::ChatHistory;
use crate::error::Result;
use crate::llm::{LlmProvider, LlmRequest, Message, observed_answer};
use crate::testing::{PassingCriteria, TestCase, TestSuite};

pub const NAME: &str = "s03_conversation_history";
pub const DESCRIPTION: &str = "Remembers the conversation across questions";

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the conversation so far to \
answer follow-up questions.";

/// Keeps every exchanged message and replays it to the model
pub struct ConversationHistoryBot {
    llm: Arc<dyn LlmProvider>,
    history: Mutex<ChatHistory>,
}

impl ConversationHistoryBot {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            history: Mutex::new(ChatHistory::new()),
        }
    }

    /// Number of messages remembered
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[async_trait]
impl ChatBot for ConversationHistoryBot {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn reset(&self) -> Result<()> {
        self.history.lock().await.clear();
        Ok(())
    }

    async fn get_answer(&self, question: &str, ctx: &ChatContext) -> Result<String> {
        ctx.update_status("🧠 Thinking...");

        // lock spans the model call so turns never interleave
        let mut history = self.history.lock().await;
        let mut messages = history.with_system_prompt(SYSTEM_PROMPT);
        messages.push(Message::user(question));

        // a cancelled or failed turn must leave history untouched
        let response = observed_answer(self.llm.as_ref(), &LlmRequest::new(messages), ctx).await?;
        history.add_user_message(question);
        history.add_assistant_message(response.content.clone());
        Ok(response.content)
    }
}

pub fn test_suite() -> TestSuite {
    TestSuite::new(
        vec![
            TestCase::new("simple_factual", "What is the capital of Romania?")
                .with_keywords(["Bucharest"])
                .keep_state(),
            TestCase::new("history_reference", "What was my previous question?")
                .with_keywords(["capital", "Romania"])
                .keep_state(),
            TestCase::new("multi_turn", "Translate your first answer to German")
                .with_keywords(["Bukarest"])
                .keep_state(),
        ],
        PassingCriteria::new(0.8),
    )
    .with_name("Conversation history")
}
