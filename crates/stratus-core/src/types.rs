//! Core types for Stratus — the chat-completions message model.
//!
//! Every turn of a conversation is one [`Message`] variant, tagged by `role`
//! on the wire. The same value is used from construction through
//! serialization; there is no second, map-shaped representation.

use serde::{Deserialize, Serialize};

use crate::error::ConversationError;

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
///
/// Each variant maps to a `role` field value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        /// Absent when the turn only requests tool calls.
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    #[serde(rename = "tool")]
    Tool {
        content: String,
        tool_call_id: String,
        /// Name of the tool that produced this result.
        name: String,
    },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Create an assistant message from a completion response turn.
    ///
    /// An empty tool-call list is stored as `None` so the wire form never
    /// carries `"tool_calls": []`.
    pub fn from_response(response: &LlmResponse) -> Self {
        Message::Assistant {
            content: response.content.clone(),
            tool_calls: if response.tool_calls.is_empty() {
                None
            } else {
                Some(response.tool_calls.clone())
            },
        }
    }

    /// Create a tool result message answering `call`.
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Message::Tool {
            content: content.into(),
            tool_call_id: call.id.clone(),
            name: call.function.name.clone(),
        }
    }

    /// The role tag as it appears on the wire.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool { .. } => "tool",
        }
    }

    /// Tool calls carried by an assistant message (empty for other roles).
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant {
                tool_calls: Some(calls),
                ..
            } => calls,
            _ => &[],
        }
    }

    /// Text content, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Message::System { content } | Message::User { content } => Some(content),
            Message::Assistant { content, .. } => content.as_deref(),
            Message::Tool { content, .. } => Some(content),
        }
    }
}

// ─────────────────────────────────────────────
// Tool Calls (function calling)
// ─────────────────────────────────────────────

/// A tool call from the assistant, requesting execution of a function.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Opaque ID assigned by the completion service (used to match results).
    pub id: String,
    /// Always "function" in current OpenAI API.
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function to call.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        ToolCall {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// The function name and arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the function/tool to call.
    pub name: String,
    /// JSON-encoded arguments string, exactly as the model emitted it.
    pub arguments: String,
}

// ─────────────────────────────────────────────
// Tool Definitions (for LLM requests)
// ─────────────────────────────────────────────

/// Definition of a tool, sent to the LLM so it knows what tools are available.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function schema.
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// The tool name.
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// One response turn from the completion service.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Text content from the assistant (None if only tool calls).
    pub content: Option<String>,
    /// Tool calls requested by the assistant, in emission order.
    pub tool_calls: Vec<ToolCall>,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    /// A plain text answer with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        LlmResponse {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A turn that only requests tool calls.
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        LlmResponse {
            tool_calls,
            ..Default::default()
        }
    }

    /// Whether the response contains tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage statistics from the LLM.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatCompletionResponse {
    /// Take the first choice as the response turn. `None` when the service
    /// returned no choices at all.
    pub fn into_response(self) -> Option<LlmResponse> {
        let usage = self.usage;
        self.choices.into_iter().next().map(|c| LlmResponse {
            content: c.message.content,
            tool_calls: c.message.tool_calls.unwrap_or_default(),
            finish_reason: c.finish_reason,
            usage,
        })
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

/// Ordered, append-only message history for one session.
///
/// Tool results can only be appended in answer to a still-open call of the
/// most recent assistant turn, so every tool message always refers back to
/// exactly one earlier [`ToolCall`].
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with a system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Start a conversation with no system prompt.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append the assistant turn described by `response`.
    pub fn push_assistant(&mut self, response: &LlmResponse) {
        self.messages.push(Message::from_response(response));
    }

    /// Append the result of `call`.
    ///
    /// Fails if `call` is not an unanswered request of the latest assistant turn.
    pub fn push_tool_result(
        &mut self,
        call: &ToolCall,
        content: impl Into<String>,
    ) -> Result<(), ConversationError> {
        if !self.open_call_ids().iter().any(|id| *id == call.id) {
            return Err(ConversationError::OrphanToolResult(call.id.clone()));
        }
        self.messages.push(Message::tool_result(call, content));
        Ok(())
    }

    /// All messages in chronological order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Total number of messages, system prompt included.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation holds no messages at all.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages excluding system prompts.
    pub fn non_system_len(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| !matches!(m, Message::System { .. }))
            .count()
    }

    /// Content of the last message if it is an assistant turn with text.
    pub fn last_assistant_content(&self) -> Option<&str> {
        match self.messages.last() {
            Some(Message::Assistant {
                content: Some(text),
                ..
            }) => Some(text),
            _ => None,
        }
    }

    /// Verify that every tool message answers exactly one call of the
    /// assistant turn preceding it, and that no call is answered twice.
    pub fn check_tool_references(&self) -> Result<(), ConversationError> {
        let mut open: Vec<&str> = Vec::new();
        for msg in &self.messages {
            match msg {
                Message::Assistant { .. } => {
                    open = msg.tool_calls().iter().map(|c| c.id.as_str()).collect();
                }
                Message::Tool { tool_call_id, .. } => {
                    let matches = open.iter().filter(|id| **id == tool_call_id.as_str()).count();
                    if matches != 1 {
                        return Err(ConversationError::OrphanToolResult(tool_call_id.clone()));
                    }
                    open.retain(|id| *id != tool_call_id.as_str());
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// IDs of the latest assistant turn's calls that have no result yet.
    fn open_call_ids(&self) -> Vec<&str> {
        let Some(pos) = self
            .messages
            .iter()
            .rposition(|m| matches!(m, Message::Assistant { .. }))
        else {
            return Vec::new();
        };

        let answered: Vec<&str> = self.messages[pos + 1..]
            .iter()
            .filter_map(|m| match m {
                Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();

        self.messages[pos]
            .tool_calls()
            .iter()
            .map(|c| c.id.as_str())
            .filter(|id| !answered.contains(id))
            .collect()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
