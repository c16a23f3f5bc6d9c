//! Dialogue loop — one LLM ↔ tool exchange over a conversation.
//!
//! ```text
//! AwaitingModel ──(no calls)──────────────────────────────────▶ Answered
//!       │
//!       └─(calls)─▶ ExecutingTools ─▶ AwaitingFinalModel ─────▶ Answered
//! ```
//!
//! At most one round of tool calls happens per exchange. The final
//! completion call carries no tool declarations, and tool calls it still
//! returns are dropped rather than executed.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use stratus_core::config::Config;
use stratus_core::error::{ConversationError, GatewayError};
use stratus_core::types::{Conversation, LlmResponse, Message, ToolCall, ToolDefinition};
use stratus_providers::traits::CompletionGateway;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::profiles::AgentProfile;
use crate::tools::executor::ToolExecutor;

/// Default upper bound for one completion call.
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 60;
/// Default upper bound for one tool call.
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

// ─────────────────────────────────────────────
// Errors & outcome
// ─────────────────────────────────────────────

/// Which completion call of an exchange failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Initial,
    Final,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Initial => f.write_str("initial"),
            Stage::Final => f.write_str("final"),
        }
    }
}

/// Failures that abort an exchange.
///
/// Tool failures never show up here; they are folded into the conversation.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("{stage} completion call failed: {source}")]
    Gateway {
        stage: Stage,
        #[source]
        source: GatewayError,
    },

    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

/// Result of one exchange.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExchangeOutcome {
    /// Final assistant text; `None` when the model produced no answer.
    pub answer: Option<String>,
    /// Number of tool calls executed during the exchange.
    pub tool_calls: usize,
}

impl ExchangeOutcome {
    /// The answer, or `fallback` when there is none.
    pub fn answer_or(&self, fallback: &str) -> String {
        self.answer.clone().unwrap_or_else(|| fallback.to_string())
    }
}

// ─────────────────────────────────────────────
// DialogueLoop
// ─────────────────────────────────────────────

/// Drives exchanges against a completion gateway.
///
/// Holds no conversation state of its own; callers own the [`Conversation`]
/// and lend it for the duration of one exchange.
#[derive(Clone)]
pub struct DialogueLoop {
    gateway: Arc<dyn CompletionGateway>,
    gateway_timeout: Duration,
    tool_timeout: Duration,
    parallel_calls: bool,
}

impl DialogueLoop {
    /// Create a loop with default timeouts and sequential tool calls.
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self {
            gateway,
            gateway_timeout: Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            parallel_calls: false,
        }
    }

    /// Create a loop using the provider and tool sections of `config`.
    pub fn from_config(gateway: Arc<dyn CompletionGateway>, config: &Config) -> Self {
        Self::new(gateway)
            .with_gateway_timeout(Duration::from_secs(config.provider.timeout_secs))
            .with_tool_timeout(Duration::from_secs(config.tools.timeout_secs))
            .with_parallel_calls(config.tools.parallel_calls)
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Run the tool calls of one turn concurrently. Results are still
    /// appended in request order.
    pub fn with_parallel_calls(mut self, parallel: bool) -> Self {
        self.parallel_calls = parallel;
        self
    }

    /// Model identifier of the underlying gateway.
    pub fn model(&self) -> &str {
        self.gateway.model()
    }

    /// Answer `query` on a fresh conversation seeded with the profile's prompt.
    pub async fn ask(
        &self,
        profile: &AgentProfile,
        query: &str,
    ) -> Result<(Conversation, ExchangeOutcome), DialogueError> {
        let mut conversation = Conversation::new(profile.system_prompt());
        let outcome = self.send(&mut conversation, profile, query).await?;
        Ok((conversation, outcome))
    }

    /// Append a user turn and run one exchange.
    pub async fn send(
        &self,
        conversation: &mut Conversation,
        profile: &AgentProfile,
        text: &str,
    ) -> Result<ExchangeOutcome, DialogueError> {
        conversation.push_user(text);
        self.run_exchange(conversation, profile).await
    }

    /// Run one exchange over `conversation`, which should end in a user turn.
    ///
    /// On error the conversation keeps whatever was appended before the
    /// failing step; it is never truncated.
    pub async fn run_exchange(
        &self,
        conversation: &mut Conversation,
        profile: &AgentProfile,
    ) -> Result<ExchangeOutcome, DialogueError> {
        debug!(
            profile = profile.name(),
            state = "awaiting_model",
            history = conversation.len(),
            "exchange started"
        );

        let mut first = self
            .complete(conversation.messages(), Some(profile.definitions()))
            .await
            .map_err(|source| {
                error!(profile = profile.name(), stage = %Stage::Initial, error = %source, "completion call failed");
                DialogueError::Gateway {
                    stage: Stage::Initial,
                    source,
                }
            })?;
        assign_unique_ids(&mut first.tool_calls);
        conversation.push_assistant(&first);

        if !first.has_tool_calls() {
            debug!(profile = profile.name(), state = "answered", "no tool calls requested");
            return Ok(ExchangeOutcome {
                answer: answer_text(&first),
                tool_calls: 0,
            });
        }

        let calls = first.tool_calls;
        info!(
            profile = profile.name(),
            state = "executing_tools",
            count = calls.len(),
            "model requested tool calls"
        );

        let executor = ToolExecutor::new(profile.tools().clone()).with_timeout(self.tool_timeout);
        let results = self.execute_all(&executor, &calls).await;
        for (call, result) in calls.iter().zip(results) {
            conversation.push_tool_result(call, result)?;
        }

        debug!(profile = profile.name(), state = "awaiting_final_model", "requesting final answer");
        let mut last = self
            .complete(conversation.messages(), None)
            .await
            .map_err(|source| {
                error!(profile = profile.name(), stage = %Stage::Final, error = %source, "completion call failed");
                DialogueError::Gateway {
                    stage: Stage::Final,
                    source,
                }
            })?;

        if last.has_tool_calls() {
            warn!(
                profile = profile.name(),
                count = last.tool_calls.len(),
                "final response requested more tools, ignoring"
            );
            last.tool_calls.clear();
        }
        conversation.push_assistant(&last);

        debug!(profile = profile.name(), state = "answered", "exchange finished");
        Ok(ExchangeOutcome {
            answer: answer_text(&last),
            tool_calls: calls.len(),
        })
    }

    /// Execute `calls`, returning one result per call in request order.
    async fn execute_all(&self, executor: &ToolExecutor, calls: &[ToolCall]) -> Vec<String> {
        if self.parallel_calls {
            return join_all(calls.iter().map(|call| {
                debug!(tool = %call.function.name, call_id = %call.id, "tool call");
                executor.execute(call)
            }))
            .await;
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            debug!(tool = %call.function.name, call_id = %call.id, "tool call");
            results.push(executor.execute(call).await);
        }
        results
    }

    async fn complete(
        &self,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, GatewayError> {
        let tools = tools.filter(|t| !t.is_empty());
        tokio::time::timeout(self.gateway_timeout, self.gateway.complete(history, tools))
            .await
            .map_err(|_| GatewayError::Timeout(self.gateway_timeout.as_secs()))?
    }
}

/// Re-key calls whose id is blank or repeats an earlier one, so every
/// tool result can be matched to exactly one call.
fn assign_unique_ids(calls: &mut [ToolCall]) {
    let mut seen = HashSet::new();
    for index in 0..calls.len() {
        let id = calls[index].id.trim();
        if !id.is_empty() && !seen.contains(id) {
            seen.insert(id.to_string());
            continue;
        }

        let mut suffix = index;
        let mut fresh = format!("call_{suffix}");
        while seen.contains(&fresh) || calls.iter().any(|c| c.id == fresh) {
            suffix += 1;
            fresh = format!("call_{suffix}");
        }
        warn!(
            tool = %calls[index].function.name,
            original = %calls[index].id,
            assigned = %fresh,
            "tool call id missing or duplicated, re-keyed"
        );
        calls[index].id = fresh.clone();
        seen.insert(fresh);
    }
}

/// Non-blank text content of a response.
fn answer_text(response: &LlmResponse) -> Option<String> {
    response
        .content
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
