//! Conversation history kept by stateful chatbots
//!
//! # Example
//!
//! ```rust
//! use parley_core::conversation::ChatHistory;
//! use parley_core::llm::MessageRole;
//!
//! let mut history = ChatHistory::new();
//! history.add_user_message("What is the capital of Romania?");
//! history.add_assistant_message("Bucharest.");
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.last_message_from(MessageRole::User).unwrap().content, "What is the capital of Romania?");
//! ```

mod history;

pub use history::ChatHistory;
