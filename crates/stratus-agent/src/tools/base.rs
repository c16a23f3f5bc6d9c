//! Tool trait — the interface every agent tool implements.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use stratus_core::types::ToolDefinition;

// ─────────────────────────────────────────────
// Tool output
// ─────────────────────────────────────────────

/// What a tool hands back before it is coerced to text for the model.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolOutput {
    /// Scalar or prose result, passed through verbatim.
    Text(String),
    /// Structured result, JSON-encoded on the way out.
    Json(Value),
}

impl ToolOutput {
    /// Coerce to the text the model reads.
    pub fn into_text(self) -> String {
        match self {
            ToolOutput::Text(s) => s,
            ToolOutput::Json(v) => v.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The registry discovers tools via `name()`, sends their schemas to the LLM
/// via `to_definition()`, and dispatches calls via `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the LLM to call this tool (e.g. `"calculator"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Execute the tool with already-validated arguments.
    ///
    /// On failure, return an `Err` — the executor turns it into an error
    /// string the model can read.
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<ToolOutput>;

    /// Build the `ToolDefinition` sent to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract an optional integer param.
pub fn optional_i64(params: &HashMap<String, Value>, key: &str) -> Option<i64> {
    params.get(key).and_then(|v| v.as_i64())
}

/// Check `params` against a tool's JSON schema.
///
/// Covers the subset the built-in tools declare: `required`, primitive
/// `type`s, and numeric `minimum`/`maximum`. Undeclared keys are ignored.
pub fn validate_params(schema: &Value, params: &HashMap<String, Value>) -> Result<(), String> {
    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for key in required.iter().filter_map(|k| k.as_str()) {
            if !params.contains_key(key) {
                return Err(format!("missing required parameter '{key}'"));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return Ok(());
    };

    for (key, value) in params {
        let Some(prop) = properties.get(key) else {
            continue;
        };

        let expected = prop.get("type").and_then(|t| t.as_str()).unwrap_or("");
        let type_ok = match expected {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        };
        if !type_ok {
            return Err(format!("parameter '{key}' must be of type {expected}"));
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = prop.get("minimum").and_then(|m| m.as_f64()) {
                if n < min {
                    return Err(format!("parameter '{key}' must be >= {min}, got {value}"));
                }
            }
            if let Some(max) = prop.get("maximum").and_then(|m| m.as_f64()) {
                if n > max {
                    return Err(format!("parameter '{key}' must be <= {max}, got {value}"));
                }
            }
        }
    }

    Ok(())
}
