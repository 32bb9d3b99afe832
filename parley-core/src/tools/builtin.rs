//! Tools used by the tool calling lesson

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::Tool;
use crate::error::{ParleyError, Result};

/// Reports the current date and time in UTC
#[derive(Debug, Clone, Default)]
pub struct CurrentTimeTool {
    fixed: Option<DateTime<Utc>>,
}

impl CurrentTimeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always report `time`
    pub fn with_fixed_time(time: DateTime<Utc>) -> Self {
        Self { fixed: Some(time) }
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Returns the current date and time in UTC"
    }

    async fn call(&self, _arguments: Value) -> Result<Value> {
        let now = self.fixed.unwrap_or_else(Utc::now);
        Ok(Value::String(now.format("%Y-%m-%d %H:%M:%S UTC").to_string()))
    }
}

/// Units of each currency per US dollar
const REFERENCE_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("CHF", 0.88),
    ("JPY", 149.5),
    ("RON", 4.58),
];

#[derive(Debug, Deserialize)]
struct ConversionArgs {
    amount: f64,
    from: String,
    to: String,
}

/// Converts amounts between currencies using a static reference rate table
#[derive(Debug, Clone, Default)]
pub struct ConvertCurrencyTool;

impl ConvertCurrencyTool {
    pub fn new() -> Self {
        Self
    }

    /// Currencies the tool knows
    pub fn currencies() -> impl Iterator<Item = &'static str> {
        REFERENCE_RATES.iter().map(|(code, _)| *code)
    }

    fn rate(code: &str) -> Result<f64> {
        REFERENCE_RATES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(code))
            .map(|(_, rate)| *rate)
            .ok_or_else(|| ParleyError::Tool(format!("Unsupported currency '{}'", code)))
    }

    /// Convert `amount` from one currency to another
    pub fn convert(amount: f64, from: &str, to: &str) -> Result<f64> {
        if !amount.is_finite() {
            return Err(ParleyError::Tool(format!("Invalid amount {}", amount)));
        }
        Ok(amount / Self::rate(from)? * Self::rate(to)?)
    }
}

#[async_trait]
impl Tool for ConvertCurrencyTool {
    fn name(&self) -> &str {
        "convert_currency"
    }

    fn description(&self) -> &str {
        "Converts an amount of money from one currency to another"
    }

    fn parameters(&self) -> Value {
        let codes: Vec<&str> = Self::currencies().collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "amount": {"type": "number", "description": "Amount to convert"},
                "from": {"type": "string", "enum": codes, "description": "Source currency code"},
                "to": {"type": "string", "enum": codes, "description": "Target currency code"}
            },
            "required": ["amount", "from", "to"],
            "additionalProperties": false
        })
    }

    async fn call(&self, arguments: Value) -> Result<Value> {
        let args: ConversionArgs = serde_json::from_value(arguments)
            .map_err(|e| ParleyError::Tool(format!("Invalid arguments: {}", e)))?;
        let converted = Self::convert(args.amount, &args.from, &args.to)?;
        Ok(Value::String(format!(
            "{:.2} {} = {:.2} {}",
            args.amount,
            args.from.to_uppercase(),
            converted,
            args.to.to_uppercase()
        )))
    }
}
