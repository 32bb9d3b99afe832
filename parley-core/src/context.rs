//! Status channel between chatbot internals and whoever is watching
//!
//! A [`ChatContext`] is handed to [`crate::chatbot::ChatBot::get_answer`]. The
//! chatbot publishes free-text narration through it (tool calls, retrieved
//! context, intermediate reasoning) without knowing whether a terminal, a live
//! view or nobody at all is on the other end.
//!
//! Publishing is fire-and-forget and the context is cheap to clone, so nested
//! sub-operations and concurrently running tools can each hold their own copy.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::live::StatusEvent;
use crate::llm::Message;

/// Maximum number of characters of tool arguments or results shown in a status line
pub const MAX_TOOL_OUTPUT: usize = 100;

/// Label used for tool events whose start was never observed
pub const FALLBACK_TOOL_NAME: &str = "tool";

/// Callback receiving status text
pub type StatusCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Truncate `text` to `max` characters, noting how many were dropped.
///
/// ```
/// use parley_core::context::truncate;
///
/// assert_eq!(truncate("short", 10), "short");
/// assert_eq!(truncate("abcdef", 4), "abcd...[2 more]");
/// ```
pub fn truncate(text: &str, max: usize) -> String {
    let total = text.chars().count();
    if total <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max).collect();
    format!("{}...[{} more]", kept, total - max)
}

/// Status channel handed to chatbots while they produce an answer
#[derive(Clone, Default)]
pub struct ChatContext {
    status_fn: Option<StatusCallback>,
    tool_calls: Arc<Mutex<HashMap<Uuid, String>>>,
    verbose: bool,
}

impl fmt::Debug for ChatContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatContext")
            .field("has_sink", &self.status_fn.is_some())
            .field("pending_tool_calls", &self.registry().len())
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl ChatContext {
    /// A context that discards everything published to it
    pub fn silent() -> Self {
        Self::default()
    }

    /// A context forwarding status text to `callback`
    pub fn new(callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            status_fn: Some(Arc::new(callback)),
            ..Self::default()
        }
    }

    /// A context pushing [`StatusEvent::Status`] events into a live session queue
    pub fn from_sender(sender: UnboundedSender<StatusEvent>) -> Self {
        Self::new(move |text| {
            // receiver gone means nobody is rendering anymore
            let _ = sender.send(StatusEvent::status(text));
        })
    }

    /// Enable narration of full model requests and responses
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether model transcripts are narrated
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Publish a status message
    pub fn update_status(&self, message: &str) {
        if let Some(ref status_fn) = self.status_fn {
            status_fn(message);
        }
    }

    /// Narration requested by a chatbot step
    pub fn on_text(&self, text: &str) {
        self.update_status(text);
    }

    /// Named event raised by a nested step; only `"text"` events are shown
    pub fn on_custom_event(&self, name: &str, data: &Value) {
        if name == "text" {
            let text = data.get("text").and_then(Value::as_str).unwrap_or_default();
            self.update_status(text);
        }
    }

    /// A tool invocation started
    pub fn on_tool_start(&self, run_id: Uuid, tool_name: Option<&str>, input: &str) {
        let tool_name = tool_name.unwrap_or(FALLBACK_TOOL_NAME).to_string();
        self.registry().insert(run_id, tool_name.clone());

        let args = input.trim_matches(|c| c == '{' || c == '}');
        self.update_status(&format!(
            "🔨 Calling {}({})",
            tool_name,
            truncate(args, MAX_TOOL_OUTPUT)
        ));
    }

    /// A tool invocation returned
    pub fn on_tool_end(&self, run_id: Uuid, output: &str) {
        let tool_name = self.take_tool_name(run_id);
        self.update_status(&format!(
            "📦 {} returned: {}",
            tool_name,
            truncate(output, MAX_TOOL_OUTPUT)
        ));
    }

    /// A tool invocation failed
    pub fn on_tool_error(&self, run_id: Uuid, error: impl fmt::Display) {
        let tool_name = self.take_tool_name(run_id);
        self.update_status(&format!("❌ Failed {}: {}", tool_name, error));
    }

    /// A model request is about to be sent
    pub fn on_chat_model_start(&self, messages: &[Message]) {
        if !self.verbose {
            return;
        }
        self.update_status("=== CHAT REQUEST ===");
        for message in messages {
            self.update_status(&format!(
                "{}: {}",
                message.role.as_str().to_uppercase(),
                message.content
            ));
        }
    }

    /// A model response arrived
    pub fn on_llm_end(&self, response: &Message) {
        if !self.verbose {
            return;
        }
        self.update_status("=== CHAT RESPONSE ===");
        self.update_status(&response.content);
    }

    /// A model request failed
    pub fn on_llm_error(&self, error: impl fmt::Display) {
        self.update_status(&format!("❌ LLM failed: {}", error));
    }

    fn take_tool_name(&self, run_id: Uuid) -> String {
        self.registry()
            .remove(&run_id)
            .unwrap_or_else(|| FALLBACK_TOOL_NAME.to_string())
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<Uuid, String>> {
        // the map holds plain strings, a poisoned lock leaves it consistent
        self.tool_calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
