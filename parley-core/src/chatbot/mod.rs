//! The chatbot capability under test
//!
//! Every lesson implements [`ChatBot`]. The harness only ever calls
//! [`ChatBot::reset`] and [`ChatBot::get_answer`]; how the answer is produced
//! (plain prompting, history, tools) is the implementation's business.

mod registry;

pub use registry::{ChatBotEntry, ChatBotFactory, ChatBotRegistry, SuiteFactory};

use async_trait::async_trait;

use crate::context::ChatContext;
use crate::error::Result;

/// A conversational assistant.
///
/// Implementations keep their conversational state behind interior mutability
/// so a single instance can be shared between the evaluator, live sessions and
/// worker tasks.
#[async_trait]
pub trait ChatBot: Send + Sync {
    /// Registry identifier, e.g. `s03_conversation_history`
    fn name(&self) -> &str;

    /// One-line description shown in listings
    fn description(&self) -> &str {
        ""
    }

    /// Clear conversational state.
    ///
    /// Must be idempotent. The default implementation has nothing to clear.
    async fn reset(&self) -> Result<()> {
        Ok(())
    }

    /// Produce the reply to `question`.
    ///
    /// Progress narration goes through `ctx`; it may be published from any
    /// task the implementation spawns.
    async fn get_answer(&self, question: &str, ctx: &ChatContext) -> Result<String>;
}
