//! Tool lookup and execution

use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use super::{Tool, render_output};
use crate::context::ChatContext;
use crate::error::{ParleyError, Result};
use crate::llm::{Message, ToolCall, ToolSpec};

/// The tools of one chatbot, in registration order
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool.
    ///
    /// # Errors
    ///
    /// Returns an error if a tool with the same name is already present.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.get(tool.name()).is_some() {
            return Err(ParleyError::Tool(format!(
                "Tool '{}' is already registered",
                tool.name()
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Add a tool, builder style
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Result<Self> {
        self.register(Arc::new(tool))?;
        Ok(self)
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Descriptions offered to the model
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute one call and turn its outcome into a tool message.
    ///
    /// Failures, including unknown tools, are reported to the model as the
    /// message content rather than returned as errors.
    pub async fn execute(&self, call: &ToolCall, ctx: &ChatContext) -> Message {
        let run_id = Uuid::new_v4();
        ctx.on_tool_start(run_id, Some(&call.name), &call.arguments.to_string());

        let outcome = match self.get(&call.name) {
            Some(tool) => tool.call(call.arguments.clone()).await,
            None => Err(ParleyError::Tool(format!("Unknown tool '{}'", call.name))),
        };

        match outcome {
            Ok(output) => {
                let text = render_output(&output);
                ctx.on_tool_end(run_id, &text);
                Message::tool_result(call.id.clone(), text)
            }
            Err(e) => {
                tracing::debug!(tool = %call.name, error = %e, "Tool call failed");
                ctx.on_tool_error(run_id, &e);
                Message::tool_result(call.id.clone(), format!("Error: {}", e))
            }
        }
    }

    /// Execute calls concurrently; results keep the order of `calls`
    pub async fn execute_all(&self, calls: &[ToolCall], ctx: &ChatContext) -> Vec<Message> {
        join_all(calls.iter().map(|call| self.execute(call, ctx))).await
    }
}
