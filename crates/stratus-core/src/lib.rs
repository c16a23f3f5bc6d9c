//! Stratus core — message model, error taxonomy, configuration, and helpers
//! shared by the gateway, agent, and CLI crates.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::{GatewayError, ToolError};
pub use types::{Conversation, LlmResponse, Message, ToolCall, ToolDefinition};
