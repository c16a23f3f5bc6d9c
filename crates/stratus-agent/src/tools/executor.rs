//! Tool Executor — turns a model's raw tool-call request into text.
//!
//! Every failure a tool can produce (unknown name, malformed payload, schema
//! violation, handler error, timeout) comes back as an `Error: ...` string
//! from [`ToolExecutor::execute`], so the model can see and react to it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use stratus_core::error::ToolError;
use stratus_core::types::ToolCall;
use stratus_core::utils::truncate_string;
use tracing::{debug, warn};

use super::base::validate_params;
use super::registry::ToolRegistry;

/// Default upper bound for one tool call.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runs tool calls against a registry.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolExecutor {
    /// Create an executor over `registry` with the default timeout.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute a tool call, always producing text for the model.
    pub async fn execute(&self, call: &ToolCall) -> String {
        match self
            .try_execute(&call.function.name, &call.function.arguments)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(tool = %call.function.name, call_id = %call.id, error = %e, "tool call failed");
                format!("Error: {e}")
            }
        }
    }

    /// Execute `name` with the raw JSON argument payload, surfacing failures.
    pub async fn try_execute(&self, name: &str, raw_arguments: &str) -> Result<String, ToolError> {
        let tool = self.registry.handler_for(name)?;
        let params = parse_arguments(name, raw_arguments)?;

        validate_params(&tool.parameters(), &params).map_err(|reason| {
            ToolError::InvalidArguments {
                tool: name.to_string(),
                reason,
            }
        })?;

        debug!(tool = %name, "executing tool");

        let output = tokio::time::timeout(self.timeout, tool.execute(params))
            .await
            .map_err(|_| ToolError::Timeout {
                tool: name.to_string(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| ToolError::Handler {
                tool: name.to_string(),
                source,
            })?;

        let text = output.into_text();
        debug!(tool = %name, result = %truncate_string(&text, 120), "tool result");
        Ok(text)
    }
}

/// Parse a raw argument payload into a key/value map.
///
/// An empty payload means "no arguments"; anything else must be a JSON object.
fn parse_arguments(tool: &str, raw: &str) -> Result<HashMap<String, Value>, ToolError> {
    if raw.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let parse_err = |reason: String| ToolError::ArgumentParse {
        tool: tool.to_string(),
        reason,
    };

    match serde_json::from_str::<Value>(raw).map_err(|e| parse_err(e.to_string()))? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(parse_err(format!("expected a JSON object, got {other}"))),
    }
}
