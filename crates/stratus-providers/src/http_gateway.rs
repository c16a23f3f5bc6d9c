//! Completion gateway for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Works with the hosted OpenAI API and any self-hosted or proxy service that
//! speaks the same request/response shape.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use stratus_core::config::schema::ProviderSettings;
use stratus_core::error::GatewayError;
use stratus_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, LlmResponse, Message, ToolDefinition,
};

use crate::traits::{CompletionGateway, LlmRequestConfig};

// ─────────────────────────────────────────────
// HttpGateway
// ─────────────────────────────────────────────

/// Talks to an OpenAI-compatible HTTP API via `reqwest`.
pub struct HttpGateway {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Model sent with every request.
    model: String,
    /// Sampling parameters.
    request_config: LlmRequestConfig,
    timeout_secs: u64,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpGateway {
    /// Create a gateway from the provider section of the config.
    pub fn new(settings: &ProviderSettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpGateway {
            client,
            api_base: settings.api_base.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            request_config: LlmRequestConfig {
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
            },
            timeout_secs: settings.timeout_secs,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    fn build_request(
        &self,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: history.to_vec(),
            tools: tools.map(|t| t.to_vec()),
            tool_choice: tools.map(|_| "auto".to_string()),
            max_tokens: Some(self.request_config.max_tokens),
            temperature: Some(self.request_config.temperature),
        }
    }
}

#[async_trait]
impl CompletionGateway for HttpGateway {
    async fn complete(
        &self,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, GatewayError> {
        debug!(
            model = %self.model,
            messages = history.len(),
            tools = tools.map_or(0, |t| t.len()),
            "calling completion service"
        );

        let request_body = self.build_request(history, tools);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion request failed");
                if e.is_timeout() {
                    GatewayError::Timeout(self.timeout_secs)
                } else {
                    GatewayError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %body, "completion service error");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to decode completion response");
                GatewayError::Decode(e.to_string())
            })?;

        let turn = parsed.into_response().ok_or(GatewayError::EmptyResponse)?;

        debug!(
            has_content = turn.content.is_some(),
            tool_calls = turn.tool_calls.len(),
            finish_reason = turn.finish_reason.as_deref().unwrap_or("?"),
            "completion received"
        );

        Ok(turn)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn make_settings(api_key: &str, api_base: &str) -> ProviderSettings {
        ProviderSettings {
            api_key: api_key.to_string(),
            api_base: api_base.to_string(),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        }
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let gw = HttpGateway::new(&make_settings("key", "https://api.openai.com/v1/")).unwrap();
        assert_eq!(gw.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_completions_url_no_trailing_slash() {
        let gw = HttpGateway::new(&make_settings("key", "https://api.openai.com/v1")).unwrap();
        assert_eq!(gw.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_request_without_tools_has_no_tool_choice() {
        let gw = HttpGateway::new(&make_settings("key", "http://localhost")).unwrap();
        let req = gw.build_request(&[Message::user("hi")], None);
        assert!(req.tools.is_none());
        assert!(req.tool_choice.is_none());
        assert_eq!(req.model, "gpt-4o-mini");
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_complete_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "content": "It is sunny in Paris.", "tool_calls": null },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
            })))
            .mount(&mock_server)
            .await;

        let gw = HttpGateway::new(&make_settings("test-key-123", &mock_server.uri())).unwrap();
        let messages = vec![
            Message::system("You are a helpful weather assistant."),
            Message::user("Weather in Paris?"),
        ];

        let resp = gw.complete(&messages, None).await.unwrap();

        assert_eq!(resp.content.as_deref(), Some("It is sunny in Paris."));
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.as_ref().unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_complete_with_tool_calls() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({ "tool_choice": "auto" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-tools",
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc123",
                            "type": "function",
                            "function": {
                                "name": "get_current_weather",
                                "arguments": "{\"location\": \"Paris\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": null
            })))
            .mount(&mock_server)
            .await;

        let gw = HttpGateway::new(&make_settings("key", &mock_server.uri())).unwrap();
        let tool_def = ToolDefinition::new(
            "get_current_weather",
            "Get the current weather in a given location",
            json!({"type": "object", "properties": {"location": {"type": "string"}}}),
        );

        let resp = gw
            .complete(&[Message::user("Paris?")], Some(&[tool_def]))
            .await
            .unwrap();

        assert!(resp.content.is_none());
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].function.name, "get_current_weather");
        assert_eq!(resp.tool_calls[0].id, "call_abc123");
    }

    #[tokio::test]
    async fn test_complete_without_tools_omits_tools_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(|req: &Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                let content = if body.get("tools").is_none() { "no tools" } else { "tools" };
                ResponseTemplate::new(200).set_body_json(json!({
                    "choices": [{ "message": { "content": content }, "finish_reason": "stop" }]
                }))
            })
            .mount(&mock_server)
            .await;

        let gw = HttpGateway::new(&make_settings("key", &mock_server.uri())).unwrap();
        let resp = gw.complete(&[Message::user("hi")], None).await.unwrap();
        assert_eq!(resp.content.as_deref(), Some("no tools"));
    }

    #[tokio::test]
    async fn test_complete_api_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit exceeded", "type": "rate_limit_error" }
            })))
            .mount(&mock_server)
            .await;

        let gw = HttpGateway::new(&make_settings("key", &mock_server.uri())).unwrap();
        let err = gw.complete(&[Message::user("Hello")], None).await.unwrap_err();

        match err {
            GatewayError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit exceeded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_complete_network_error() {
        let gw = HttpGateway::new(&make_settings("key", "http://127.0.0.1:1")).unwrap();
        let err = gw.complete(&[Message::user("Hello")], None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Request(_)));
    }

    #[tokio::test]
    async fn test_complete_no_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        let gw = HttpGateway::new(&make_settings("key", &mock_server.uri())).unwrap();
        let err = gw.complete(&[Message::user("Hello")], None).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let gw = HttpGateway::new(&make_settings("key", &mock_server.uri())).unwrap();
        let err = gw.complete(&[Message::user("Hello")], None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn test_complete_sends_model_and_history() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 1024,
                "messages": [{ "role": "user", "content": "test" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" }, "finish_reason": "stop" }]
            })))
            .mount(&mock_server)
            .await;

        let gw = HttpGateway::new(&make_settings("key", &mock_server.uri())).unwrap();
        let resp = gw.complete(&[Message::user("test")], None).await.unwrap();

        // If the body matcher fails, wiremock returns 404 → we'd get an error
        assert_eq!(resp.content.as_deref(), Some("ok"));
    }
}
