//! Registry of chatbot implementations and their test suites
//!
//! Chatbots are registered explicitly at startup, each under a unique name,
//! together with an optional constructor for the test suite that grades it.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry = ChatBotRegistry::new();
//! registry.register(
//!     ChatBotEntry::new("s01_prompting", move || Ok(Arc::new(PromptingBot::new(llm.clone())) as _))
//!         .with_description("Answers with a single model call")
//!         .with_suite(prompting::test_suite),
//! )?;
//!
//! let chatbot = registry.load("s01_prompting")?;
//! let suite = registry.test_suite("s01_prompting")?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ChatBot;
use crate::error::{ParleyError, Result};
use crate::testing::TestSuite;

/// Constructs a fresh chatbot instance
pub type ChatBotFactory = Arc<dyn Fn() -> Result<Arc<dyn ChatBot>> + Send + Sync>;

/// Constructs the test suite grading a chatbot
pub type SuiteFactory = fn() -> TestSuite;

/// A registered chatbot implementation
#[derive(Clone)]
pub struct ChatBotEntry {
    name: String,
    description: String,
    factory: ChatBotFactory,
    suite: Option<SuiteFactory>,
}

impl std::fmt::Debug for ChatBotEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatBotEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("has_suite", &self.suite.is_some())
            .finish()
    }
}

impl ChatBotEntry {
    /// Create an entry with a constructor
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn() -> Result<Arc<dyn ChatBot>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            factory: Arc::new(factory),
            suite: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a test suite
    pub fn with_suite(mut self, suite: SuiteFactory) -> Self {
        self.suite = Some(suite);
        self
    }

    /// Registered name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether a test suite is attached
    pub fn has_suite(&self) -> bool {
        self.suite.is_some()
    }
}

/// Chatbot implementations keyed by name
#[derive(Debug, Default)]
pub struct ChatBotRegistry {
    entries: BTreeMap<String, ChatBotEntry>,
}

impl ChatBotRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or already taken.
    pub fn register(&mut self, entry: ChatBotEntry) -> Result<()> {
        if entry.name.trim().is_empty() {
            return Err(ParleyError::Configuration(
                "Chatbot name must not be empty".to_string(),
            ));
        }
        if self.entries.contains_key(&entry.name) {
            return Err(ParleyError::Configuration(format!(
                "Chatbot '{}' is already registered",
                entry.name
            )));
        }
        tracing::debug!(chatbot = %entry.name, "Registered chatbot");
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Registered entries in name order
    pub fn entries(&self) -> impl Iterator<Item = &ChatBotEntry> {
        self.entries.values()
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&ChatBotEntry> {
        self.entries.get(name)
    }

    /// Number of registered implementations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construct the chatbot registered under `name`
    pub fn load(&self, name: &str) -> Result<Arc<dyn ChatBot>> {
        let entry = self
            .get(name)
            .ok_or_else(|| ParleyError::ChatbotNotFound(name.to_string()))?;
        let chatbot = (entry.factory)()?;
        tracing::info!(chatbot = %name, "Loaded chatbot");
        Ok(chatbot)
    }

    /// Test suite attached to `name`, if any
    pub fn test_suite(&self, name: &str) -> Result<Option<TestSuite>> {
        let entry = self
            .get(name)
            .ok_or_else(|| ParleyError::ChatbotNotFound(name.to_string()))?;
        Ok(entry.suite.map(|suite| suite()))
    }
}
