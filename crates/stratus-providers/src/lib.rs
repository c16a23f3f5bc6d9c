//! Completion gateway layer for Stratus.
//!
//! - [`traits::CompletionGateway`] — the boundary the dialogue loop talks to
//! - [`http_gateway::HttpGateway`] — OpenAI-compatible `/chat/completions` client

pub mod http_gateway;
pub mod traits;

pub use http_gateway::HttpGateway;
pub use traits::{CompletionGateway, LlmRequestConfig};
