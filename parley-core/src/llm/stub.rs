//! Offline provider answering from predetermined rules
//!
//! Rules are matched against the latest user message, so lessons, their test
//! suites and the console all run without network access or a real model.
//!
//! ```yaml
//! fallback_answer: "I don't know."
//! rules:
//!   - when: capital of france
//!     answer: The capital of France is Paris.
//!   - when: usd
//!     tool_calls:
//!       - name: convert_currency
//!         arguments: { amount: 100, from: USD, to: EUR }
//!     answer: "Yes, that is {tool_results} EUR."
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{LlmProvider, LlmRequest, Message, MessageRole, ToolCall};
use crate::error::{ParleyError, Result};

/// Placeholder in a rule answer replaced by the collected tool results
const TOOL_RESULTS_PLACEHOLDER: &str = "{tool_results}";

/// Tool call issued by a stub rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubToolCall {
    pub name: String,
    #[serde(default = "empty_object")]
    pub arguments: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// A predetermined answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubRule {
    /// Case-insensitive substring of the latest user message; empty matches anything
    #[serde(default)]
    pub when: String,

    /// Answer text; `{tool_results}` is replaced by the tool outputs
    pub answer: String,

    /// Tools to call before answering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<StubToolCall>,
}

impl StubRule {
    /// Answer `answer` whenever the question contains `when`
    pub fn new(when: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            when: when.into(),
            answer: answer.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Call a tool before answering
    pub fn with_tool_call(mut self, name: impl Into<String>, arguments: Value) -> Self {
        self.tool_calls.push(StubToolCall {
            name: name.into(),
            arguments,
        });
        self
    }

    fn matches(&self, question: &str) -> bool {
        question
            .to_lowercase()
            .contains(&self.when.to_lowercase())
    }
}

#[derive(Debug, Deserialize)]
struct StubFixture {
    #[serde(default)]
    fallback_answer: Option<String>,
    #[serde(default)]
    rules: Vec<StubRule>,
}

/// Provider that answers from [`StubRule`]s
#[derive(Debug)]
pub struct StubProvider {
    rules: Vec<StubRule>,
    fallback_answer: String,
    call_count: AtomicUsize,
}

impl StubProvider {
    /// Create a provider with no rules
    pub fn new(fallback_answer: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback_answer: fallback_answer.into(),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Add a rule; earlier rules win
    pub fn with_rule(mut self, rule: StubRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add several rules
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = StubRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Load rules from a YAML or JSON fixture file.
    ///
    /// A `fallback_answer` in the file overrides the one passed in.
    pub fn from_file(path: impl AsRef<Path>, fallback_answer: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ParleyError::Configuration(format!(
                "Failed to read stub fixtures {}: {}",
                path.display(),
                e
            ))
        })?;
        let fixture: StubFixture = serde_yaml::from_str(&content)?;

        let fallback = fixture
            .fallback_answer
            .unwrap_or_else(|| fallback_answer.into());
        tracing::debug!(
            rules = fixture.rules.len(),
            path = %path.display(),
            "Loaded stub fixtures"
        );
        Ok(Self::new(fallback).with_rules(fixture.rules))
    }

    /// Number of answered requests
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn find_rule(&self, question: &str) -> Option<&StubRule> {
        self.rules.iter().find(|rule| rule.matches(question))
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn answer(&self, request: &LlmRequest) -> Result<Message> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let Some(question_index) = request
            .messages
            .iter()
            .rposition(|m| m.role == MessageRole::User)
        else {
            return Err(ParleyError::Llm("Request has no user message".to_string()));
        };
        let question = &request.messages[question_index].content;

        let Some(rule) = self.find_rule(question) else {
            return Ok(Message::assistant(self.fallback_answer.clone()));
        };

        let tool_results: Vec<&str> = request.messages[question_index + 1..]
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .map(|m| m.content.as_str())
            .collect();

        if !rule.tool_calls.is_empty() && tool_results.is_empty() {
            let calls = rule
                .tool_calls
                .iter()
                .enumerate()
                .map(|(i, call)| ToolCall {
                    id: format!("call_{}", i + 1),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                })
                .collect();
            return Ok(Message::tool_request(calls));
        }

        Ok(Message::assistant(
            rule.answer
                .replace(TOOL_RESULTS_PLACEHOLDER, &tool_results.join(", ")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_rule_matching_is_case_insensitive() {
        let provider = StubProvider::new("no idea")
            .with_rule(StubRule::new("Capital of FRANCE", "Paris"));

        let answer = provider
            .answer(&LlmRequest::from_prompt("What is the capital of France?"))
            .await
            .unwrap();
        assert_eq!(answer.content, "Paris");

        let answer = provider
            .answer(&LlmRequest::from_prompt("What is the capital of Peru?"))
            .await
            .unwrap();
        assert_eq!(answer.content, "no idea");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = StubProvider::new("no idea").with_rule(
            StubRule::new("usd", "That is {tool_results} EUR")
                .with_tool_call("convert_currency", json!({"amount": 100})),
        );

        let mut request = LlmRequest::from_prompt("How much is 100 USD?");
        let first = provider.answer(&request).await.unwrap();
        assert!(first.has_tool_calls());
        assert_eq!(first.tool_calls[0].id, "call_1");
        assert_eq!(first.tool_calls[0].name, "convert_currency");

        request.messages.push(first);
        request.messages.push(Message::tool_result("call_1", "92.5"));
        let second = provider.answer(&request).await.unwrap();
        assert_eq!(second.content, "That is 92.5 EUR");
    }

    #[tokio::test]
    async fn test_requires_user_message() {
        let provider = StubProvider::new("no idea");
        let request = LlmRequest::new(vec![Message::system("sys")]);
        assert!(provider.answer(&request).await.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
fallback_answer: "Beats me"
rules:
  - when: paris
    answer: Bonjour
  - when: usd
    answer: "{{tool_results}}"
    tool_calls:
      - name: convert_currency
"#
        )
        .unwrap();

        let provider = StubProvider::from_file(file.path(), "unused").unwrap();
        assert_eq!(provider.fallback_answer, "Beats me");
        assert_eq!(provider.rules.len(), 2);
        assert_eq!(provider.rules[1].tool_calls[0].arguments, json!({}));
    }

    #[test]
    fn test_from_missing_file() {
        let err = StubProvider::from_file("/nonexistent/stubs.yaml", "x").unwrap_err();
        assert!(matches!(err, ParleyError::Configuration(_)));
    }
}
