//! Completion gateway trait — the boundary to the hosted language model.

use async_trait::async_trait;
use stratus_core::error::GatewayError;
use stratus_core::types::{LlmResponse, Message, ToolDefinition};

/// Sampling parameters passed with each completion call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// Sends a message history to the completion service and returns one turn.
///
/// Implementations never interpret the model's reasoning; they only surface
/// the text content and the requested tool calls.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Request one assistant turn.
    ///
    /// # Arguments
    /// * `history` — Full conversation in chronological order.
    /// * `tools`   — Tool declarations the model may call. `None` means the
    ///   model must answer in text.
    ///
    /// Transport, status, and decoding failures are returned as
    /// [`GatewayError`]; they are never disguised as assistant content.
    async fn complete(
        &self,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, GatewayError>;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
