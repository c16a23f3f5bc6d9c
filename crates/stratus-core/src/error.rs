//! Error taxonomy shared across Stratus crates.
//!
//! Tool-level errors are recovered by the agent and shown to the model as
//! text. Gateway errors are propagated to whoever started the exchange.

use thiserror::Error;

/// Failures raised while registering, resolving, or running a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{0}' is already registered")]
    DuplicateName(String),

    #[error("Tool '{0}' not found")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    ArgumentParse { tool: String, reason: String },

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("{tool} failed: {source}")]
    Handler {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },
}

/// Failures of the completion service call itself.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode completion response: {0}")]
    Decode(String),

    #[error("completion response contained no choices")]
    EmptyResponse,

    #[error("completion request timed out after {0}s")]
    Timeout(u64),
}

/// Violations of the conversation's append-only invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ConversationError {
    #[error("tool result '{0}' does not answer an open tool call")]
    OrphanToolResult(String),
}
