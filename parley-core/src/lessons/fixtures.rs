//! Offline answers for the lesson test suites

use serde_json::json;

use crate::llm::StubRule;

/// Stub rules answering every lesson question the way a capable model would
pub fn offline_rules() -> Vec<StubRule> {
    vec![
        StubRule::new("capital of france", "The capital of France is Paris."),
        StubRule::new(
            "what python is",
            "Python is a high-level programming language known for its readable syntax.",
        ),
        StubRule::new("merry christmas in german", "In German you say \"Frohe Weihnachten\"!"),
        StubRule::new(
            "your personality",
            "Oh, I'm super bubbly and cheerful! I love making every answer a little brighter.",
        ),
        StubRule::new("capital of romania", "The capital of Romania is Bucharest."),
        StubRule::new(
            "previous question",
            "Your previous question was: What is the capital of Romania?",
        ),
        StubRule::new(
            "first answer to german",
            "Die Hauptstadt von Rumänien ist Bukarest.",
        ),
        StubRule::new("what time", "It is currently {tool_results}.")
            .with_tool_call("current_time", json!({})),
        StubRule::new("eur in usd", "{tool_results} at today's reference rate.")
            .with_tool_call("convert_currency", json!({"amount": 10, "from": "EUR", "to": "USD"})),
    ]
}
