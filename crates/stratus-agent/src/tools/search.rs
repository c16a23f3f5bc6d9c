//! Simulated web search over a fixed set of canned topics.
//!
//! Each topic key is scored by how many distinct lowercase words it shares
//! with the query. The first topic to reach the highest score wins; a score
//! of zero yields the "no relevant information" sentinel.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{require_string, Tool, ToolOutput};

/// Returned when no topic shares a word with the query.
pub const NO_RESULT: &str = "No relevant information found.";

/// Canned topics, in match priority order.
const TOPICS: &[(&str, &str)] = &[
    (
        "weather forecast",
        "Weather forecasts predict atmospheric conditions for a specific location and time period. They typically include temperature, precipitation, wind, and other variables.",
    ),
    (
        "temperature conversion",
        "To convert Celsius to Fahrenheit: multiply by 9/5 and add 32. To convert Fahrenheit to Celsius: subtract 32 and multiply by 5/9.",
    ),
    (
        "climate change",
        "Climate change refers to significant changes in global temperature, precipitation, wind patterns, and other measures of climate that occur over several decades or longer.",
    ),
    (
        "severe weather",
        "Severe weather includes thunderstorms, tornadoes, hurricanes, blizzards, floods, and high winds that can cause damage, disruption, and loss of life.",
    ),
];

fn words(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Best-matching topic key for `query`, if any shares a word with it.
pub fn best_match(query: &str) -> Option<&'static str> {
    let query_words = words(query);
    let mut best: Option<(&'static str, usize)> = None;

    for &(key, _) in TOPICS {
        let score = words(key).intersection(&query_words).count();
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((key, score));
        }
    }

    best.map(|(key, _)| key)
}

/// Canned text for `query`, or [`NO_RESULT`].
pub fn lookup(query: &str) -> &'static str {
    best_match(query)
        .and_then(|key| TOPICS.iter().find(|&&(k, _)| k == key))
        .map_or(NO_RESULT, |&(_, text)| text)
}

/// `web_search(query)` — simulated, never touches the network.
pub struct SimulatedSearchTool;

#[async_trait]
impl Tool for SimulatedSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search for information on the web"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<ToolOutput> {
        let query = require_string(&params, "query")?;
        let result = lookup(&query);
        Ok(ToolOutput::Json(json!({ "query": query, "result": result })))
    }
}
