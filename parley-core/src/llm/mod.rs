//! Model provider capability
//!
//! Lessons talk to a model through [`LlmProvider`]: a list of messages goes in,
//! one message comes out. Provider adapters live outside this crate; the
//! [`StubProvider`] answers from fixture rules so lessons run offline.

mod stub;

pub use stub::{StubProvider, StubRule, StubToolCall};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ChatContext;
use crate::error::Result;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    /// Lowercase role name
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier pairing the call with its result message
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments as a JSON object
    pub arguments: Value,
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,

    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Call answered by a tool message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Instructions for the model
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// A message sent by the user
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// A message sent by the assistant
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// An assistant message asking for tool calls
    pub fn tool_request(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(MessageRole::Assistant, "")
        }
    }

    /// The result of a tool call
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(MessageRole::Tool, content)
        }
    }

    /// Whether the model asked for tools instead of answering
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Tool description offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

/// Request to an LLM provider
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,

    /// Tools the model may call
    pub tools: Vec<ToolSpec>,
}

impl LlmRequest {
    /// Create a request from a conversation
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
        }
    }

    /// Create a simple request from a single prompt
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self::new(vec![Message::user(prompt)])
    }

    /// Offer tools to the model
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Latest user message, if any
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
    }
}

/// Trait for model provider implementations.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier, for logs
    fn model_name(&self) -> &str;

    /// Produce the next message of the conversation
    async fn answer(&self, request: &LlmRequest) -> Result<Message>;
}

/// Call the provider, narrating the exchange through `ctx`.
pub async fn observed_answer(
    provider: &dyn LlmProvider,
    request: &LlmRequest,
    ctx: &ChatContext,
) -> Result<Message> {
    ctx.on_chat_model_start(&request.messages);
    match provider.answer(request).await {
        Ok(response) => {
            ctx.on_llm_end(&response);
            Ok(response)
        }
        Err(e) => {
            ctx.on_llm_error(&e);
            Err(e)
        }
    }
}
