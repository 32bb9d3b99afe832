//! Message history

use serde::{Deserialize, Serialize};

use crate::llm::{Message, MessageRole};

/// Ordered record of the messages exchanged so far
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the back of the history
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a user message
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::user(content));
    }

    /// Append an assistant message
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::assistant(content));
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages sent by `role`
    pub fn messages_from(&self, role: MessageRole) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.role == role).collect()
    }

    /// Latest message sent by `role`
    pub fn last_message_from(&self, role: MessageRole) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == role)
    }

    /// The history prefixed with a system prompt, ready for a model request
    pub fn with_system_prompt(&self, prompt: &str) -> Vec<Message> {
        std::iter::once(Message::system(prompt))
            .chain(self.messages.iter().cloned())
            .collect()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if no message was recorded
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Forget every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChatHistory {
        let mut history = ChatHistory::new();
        history.add_user_message("first question");
        history.add_assistant_message("first answer");
        history.add_user_message("second question");
        history
    }

    #[test]
    fn test_messages_from_role() {
        let history = sample();
        let questions = history.messages_from(MessageRole::User);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].content, "first question");
        assert!(history.messages_from(MessageRole::Tool).is_empty());
    }

    #[test]
    fn test_last_message_from_role() {
        let history = sample();
        assert_eq!(
            history.last_message_from(MessageRole::User).unwrap().content,
            "second question"
        );
        assert!(history.last_message_from(MessageRole::System).is_none());
    }

    #[test]
    fn test_with_system_prompt() {
        let history = sample();
        let messages = history.with_system_prompt("be nice");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[3].content, "second question");
    }

    #[test]
    fn test_clear() {
        let mut history = sample();
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }
}
