//! Declarative test suite model
//!
//! Suites are usually declared in code next to the lesson they grade, but can
//! also be loaded from YAML or JSON:
//!
//! ```yaml
//! repetitions: 2
//! passing_criteria:
//!   min_success_rate: 0.8
//!   max_average_time: 4.0
//! test_cases:
//!   - id: simple_factual
//!     question: What is the capital of France?
//!     expected_keywords: [Paris]
//!   - id: follow_up
//!     question: And of Germany?
//!     expected_keywords: [Berlin]
//!     reset_before_run: false
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::seconds;
use crate::error::{ParleyError, Result};

/// One scripted question with its keyword gate and reset policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique identifier within the suite
    pub id: String,

    /// The question asked
    pub question: String,

    /// Case-insensitive substrings that must all appear in the answer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_keywords: Vec<String>,

    /// Clear chatbot state right before this case runs
    #[serde(default = "default_reset", alias = "reset_chatbot")]
    pub reset_before_run: bool,
}

fn default_reset() -> bool {
    true
}

impl TestCase {
    /// Create a case without keyword gate that resets the chatbot
    pub fn new(id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            expected_keywords: Vec::new(),
            reset_before_run: true,
        }
    }

    /// Require keywords in the answer
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Keep the conversation of the previous case
    pub fn keep_state(mut self) -> Self {
        self.reset_before_run = false;
        self
    }
}

/// Thresholds for the aggregate verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassingCriteria {
    /// Minimum fraction of successful results (0.0-1.0)
    #[serde(default = "default_min_success_rate")]
    pub min_success_rate: f64,

    /// Maximum mean execution time; `None` disables the latency gate
    #[serde(
        default,
        with = "seconds::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_average_time: Option<Duration>,
}

fn default_min_success_rate() -> f64 {
    0.8
}

impl Default for PassingCriteria {
    fn default() -> Self {
        Self {
            min_success_rate: default_min_success_rate(),
            max_average_time: None,
        }
    }
}

impl PassingCriteria {
    /// Criteria with a success rate gate only
    pub fn new(min_success_rate: f64) -> Self {
        Self {
            min_success_rate,
            max_average_time: None,
        }
    }

    /// Add a latency gate
    pub fn with_max_average_time(mut self, max: Duration) -> Self {
        self.max_average_time = Some(max);
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_success_rate) {
            return Err(ParleyError::Suite(format!(
                "min_success_rate must be within [0, 1], got {}",
                self.min_success_rate
            )));
        }
        if self.max_average_time.is_some_and(|max| max.is_zero()) {
            return Err(ParleyError::Suite(
                "max_average_time must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ordered test cases, their criteria and how often to run them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Test cases in execution order
    pub test_cases: Vec<TestCase>,

    /// Criteria for the overall verdict
    #[serde(default)]
    pub passing_criteria: PassingCriteria,

    /// How many times the whole sequence runs
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
}

fn default_repetitions() -> u32 {
    1
}

impl TestSuite {
    /// Create a suite running once
    pub fn new(test_cases: Vec<TestCase>, passing_criteria: PassingCriteria) -> Self {
        Self {
            name: None,
            test_cases,
            passing_criteria,
            repetitions: 1,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the number of repetitions
    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Number of test cases
    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    /// Check if the suite has no test cases
    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    /// Number of case executions in a full run
    pub fn total_runs(&self) -> usize {
        self.len() * self.repetitions as usize
    }

    /// Check ids are present and unique and the criteria are in range.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for case in &self.test_cases {
            if case.id.trim().is_empty() {
                return Err(ParleyError::Suite("Test case id must not be empty".to_string()));
            }
            if !seen.insert(case.id.as_str()) {
                return Err(ParleyError::Suite(format!(
                    "Duplicate test case id '{}'",
                    case.id
                )));
            }
        }
        self.passing_criteria.validate()
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load and validate a suite file; `.json` is read as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ParleyError::Suite(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let suite = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };

        suite.validate()?;
        Ok(suite)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_case_defaults() {
        let case = TestCase::new("q1", "What is the capital of France?");
        assert!(case.reset_before_run);
        assert!(case.expected_keywords.is_empty());

        let case = case.with_keywords(["Paris"]).keep_state();
        assert!(!case.reset_before_run);
        assert_eq!(case.expected_keywords, vec!["Paris"]);
    }

    #[test]
    fn test_criteria_defaults() {
        let criteria = PassingCriteria::default();
        assert_eq!(criteria.min_success_rate, 0.8);
        assert!(criteria.max_average_time.is_none());
    }

    #[test]
    fn test_yaml_defaults_and_alias() {
        let suite = TestSuite::from_yaml_str(
            r#"
test_cases:
  - id: a
    question: first
  - id: b
    question: second
    expected_keywords: [two]
    reset_chatbot: false
passing_criteria:
  max_average_time: 2.5
"#,
        )
        .unwrap();

        assert_eq!(suite.repetitions, 1);
        assert!(suite.test_cases[0].reset_before_run);
        assert!(!suite.test_cases[1].reset_before_run);
        assert_eq!(suite.passing_criteria.min_success_rate, 0.8);
        assert_eq!(
            suite.passing_criteria.max_average_time,
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn test_json_document() {
        let suite = TestSuite::from_json_str(
            r#"{
                "test_cases": [{"id": "a", "question": "q"}],
                "passing_criteria": {"min_success_rate": 1.0},
                "repetitions": 3
            }"#,
        )
        .unwrap();
        assert_eq!(suite.total_runs(), 3);
        assert_eq!(suite.passing_criteria.min_success_rate, 1.0);
    }

    #[test]
    fn test_negative_repetitions_rejected() {
        let result = TestSuite::from_yaml_str("test_cases: []\nrepetitions: -1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_duplicates() {
        let suite = TestSuite::new(
            vec![TestCase::new("same", "one"), TestCase::new("same", "two")],
            PassingCriteria::default(),
        );
        let err = suite.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate test case id 'same'"));
    }

    #[test]
    fn test_validate_criteria_range() {
        let suite = TestSuite::new(vec![TestCase::new("a", "q")], PassingCriteria::new(1.5));
        assert!(suite.validate().is_err());

        let suite = TestSuite::new(
            vec![TestCase::new("a", "q")],
            PassingCriteria::new(0.5).with_max_average_time(Duration::ZERO),
        );
        assert!(suite.validate().is_err());
    }

    #[test]
    fn test_from_file_json_and_yaml() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"test_cases": [{{"id": "a", "question": "q"}}]}}"#).unwrap();
        assert_eq!(TestSuite::from_file(json.path()).unwrap().len(), 1);

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(yaml, "test_cases:\n  - id: a\n    question: q\n  - id: a\n    question: r\n").unwrap();
        assert!(TestSuite::from_file(yaml.path()).is_err());
    }

    #[test]
    fn test_yaml_output_keeps_criteria() {
        let suite = TestSuite::new(
            vec![TestCase::new("a", "q").with_keywords(["k"])],
            PassingCriteria::new(0.5).with_max_average_time(Duration::from_secs(4)),
        )
        .with_name("sample");

        let yaml = suite.to_yaml().unwrap();
        assert!(yaml.contains("max_average_time: 4.0"));
        assert!(yaml.contains("name: sample"));
    }
}
