//! Lesson 1: prompting
//!
//! Every question goes to the model on its own, without instructions or
//! memory of earlier questions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::chatbot::ChatBot;
use crate::context::ChatContext;
use crate::error::Result;
use crate::llm::{LlmProvider, LlmRequest, observed_answer};
use crate::testing::{PassingCriteria, TestCase, TestSuite};

pub const NAME: &str = "s01_prompting";
pub const DESCRIPTION: &str = "Answers each question with a single model call";

/// Forwards the question to the model as-is
pub struct PromptingBot {
    llm: Arc<dyn LlmProvider>,
}

impl PromptingBot {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ChatBot for PromptingBot {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn get_answer(&self, question: &str, ctx: &ChatContext) -> Result<String> {
        ctx.update_status("🧠 Thinking...");
        let request = LlmRequest::from_prompt(question);
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
            TestCase::new("translation", "Merry Christmas in German")
                .with_keywords(["Weihnachten"]),
        ],
        PassingCriteria::new(0.8),
    )
    .with_name("Prompting")
}
