//! Lesson chatbots
//!
//! Each lesson adds one capability on top of the previous one and ships the
//! test suite that grades it:
//!
//! | Lesson | Capability |
//! |--------|------------|
//! | `s01_prompting` | single model call per question |
//! | `s02_system_prompt` | fixed instructions shape every answer |
//! | `s03_conversation_history` | earlier turns are sent along |
//! | `s05_tool_calling` | the model may call tools before answering |
//!
//! Lessons only see an [`LlmProvider`]. [`offline_provider`] builds the stub
//! provider the console uses when no model adapter is wired in.

pub mod s01_prompting;
pub mod s02_system_prompt;
pub mod s03_conversation_history;
pub mod s05_tool_calling;

mod fixtures;

pub use fixtures::offline_rules;

use std::sync::Arc;

use crate::chatbot::{ChatBot, ChatBotEntry, ChatBotRegistry};
use crate::config::{ChatConfig, LlmConfig};
use crate::error::Result;
use crate::llm::{LlmProvider, StubProvider};

/// Register every lesson chatbot together with its test suite
pub fn register_all(
    registry: &mut ChatBotRegistry,
    llm: Arc<dyn LlmProvider>,
    config: &ChatConfig,
) -> Result<()> {
    let provider = llm.clone();
    registry.register(
        ChatBotEntry::new(s01_prompting::NAME, move || {
            Ok(Arc::new(s01_prompting::PromptingBot::new(provider.clone())) as Arc<dyn ChatBot>)
        })
        .with_description(s01_prompting::DESCRIPTION)
        .with_suite(s01_prompting::test_suite),
    )?;

    let provider = llm.clone();
    let system_prompt = config.system_prompt.clone();
    registry.register(
        ChatBotEntry::new(s02_system_prompt::NAME, move || {
            let mut bot = s02_system_prompt::SystemPromptBot::new(provider.clone());
            if let Some(prompt) = &system_prompt {
                bot = bot.with_system_prompt(prompt.clone());
            }
            Ok(Arc::new(bot) as Arc<dyn ChatBot>)
        })
        .with_description(s02_system_prompt::DESCRIPTION)
        .with_suite(s02_system_prompt::test_suite),
    )?;

    let provider = llm.clone();
    registry.register(
        ChatBotEntry::new(s03_conversation_history::NAME, move || {
            Ok(Arc::new(s03_conversation_history::ConversationHistoryBot::new(
                provider.clone(),
            )) as Arc<dyn ChatBot>)
        })
        .with_description(s03_conversation_history::DESCRIPTION)
        .with_suite(s03_conversation_history::test_suite),
    )?;

    let provider = llm;
    let max_rounds = config.max_tool_rounds;
    registry.register(
        ChatBotEntry::new(s05_tool_calling::NAME, move || {
            let bot = s05_tool_calling::ToolCallingBot::new(provider.clone())?
                .with_max_rounds(max_rounds);
            Ok(Arc::new(bot) as Arc<dyn ChatBot>)
        })
        .with_description(s05_tool_calling::DESCRIPTION)
        .with_suite(s05_tool_calling::test_suite),
    )?;

    Ok(())
}

/// A registry holding every lesson
pub fn default_registry(llm: Arc<dyn LlmProvider>, config: &ChatConfig) -> Result<ChatBotRegistry> {
    let mut registry = ChatBotRegistry::new();
    register_all(&mut registry, llm, config)?;
    Ok(registry)
}

/// The stub provider described by `config`.
///
/// Uses the fixture file when one is configured and the built-in lesson
/// answers otherwise.
pub fn offline_provider(config: &LlmConfig) -> Result<StubProvider> {
    match &config.fixtures {
        Some(path) => StubProvider::from_file(path, config.fallback_answer.clone()),
        None => Ok(StubProvider::new(config.fallback_answer.clone()).with_rules(offline_rules())),
    }
}
