//! Tools a chatbot can offer to the model
//!
//! A [`Tool`] is a named async function over a JSON arguments object. A
//! [`ToolSet`] holds the tools of one chatbot, describes them to the model and
//! executes the calls the model asks for, narrating each call through the
//! [`crate::context::ChatContext`].
//!
//! # Example
//!
//! ```rust,ignore
//! use parley_core::tools::{ConvertCurrencyTool, CurrentTimeTool, ToolSet};
//!
//! let tools = ToolSet::new()
//!     .with_tool(CurrentTimeTool::new())?
//!     .with_tool(ConvertCurrencyTool::new())?;
//!
//! let request = LlmRequest::new(messages).with_tools(tools.specs());
//! let response = observed_answer(llm.as_ref(), &request, ctx).await?;
//! let results = tools.execute_all(&response.tool_calls, ctx).await;
//! ```

mod builtin;
mod set;

pub use builtin::{ConvertCurrencyTool, CurrentTimeTool};
pub use set::ToolSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::llm::ToolSpec;

/// A function the model can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model refers to
    fn name(&self) -> &str;

    /// What the tool does, for the model
    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    /// Run the tool
    async fn call(&self, arguments: Value) -> Result<Value>;

    /// Description offered to the model
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Render a tool output as message text; strings are used as-is
pub fn render_output(output: &Value) -> String {
    match output {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
