//! Language-model generation client

use crate::transport::{HttpRequest, HttpTransport};
use crate::types::ConnectionStatus;
use copysmith_core::{config_error, CopysmithError, CopysmithResult, GenerationConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

const PROVIDER: &str = "generation";

/// Token budget of the connection probe
const PROBE_MAX_TOKENS: u32 = 10;
const PROBE_PROMPT: &str = "Say \"ok\" for connection test";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessagesReply {
    Failure { error: ErrorBody },
    Success { content: Vec<ContentBlock> },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Client for the text generation provider
pub struct GenerationClient {
    transport: Arc<dyn HttpTransport>,
    config: GenerationConfig,
}

impl GenerationClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: GenerationConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate text for `prompt` with the configured token budget
    pub async fn generate_text(&self, prompt: &str) -> CopysmithResult<String> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(config_error!(
                    "Generation provider API key is not configured",
                    PROVIDER
                ))
            }
        };

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "Requesting generation"
        );
        let text = self
            .complete(api_key, prompt, self.config.max_tokens)
            .await?;
        info!(chars = text.chars().count(), "Generation completed");
        Ok(text)
    }

    async fn complete(&self, api_key: &str, prompt: &str, max_tokens: u32) -> CopysmithResult<String> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        let request = HttpRequest::json(&self.config.endpoint, serde_json::to_value(&body)?)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version);

        let response = self.transport.post(&request).await?;

        match response.json::<MessagesReply>() {
            Ok(MessagesReply::Failure { error }) => Err(CopysmithError::provider(
                format!(
                    "API error: {}",
                    error.message.unwrap_or_else(|| "Unknown error".to_string())
                ),
                PROVIDER,
                Some(response.status),
            )),
            Ok(MessagesReply::Success { content }) => content
                .into_iter()
                .find_map(|block| block.text)
                .ok_or_else(|| {
                    CopysmithError::provider(
                        "Response contained no text",
                        PROVIDER,
                        Some(response.status),
                    )
                }),
            Err(e) => Err(CopysmithError::provider(
                format!("Unexpected response (HTTP {}): {}", response.status, e),
                PROVIDER,
                Some(response.status),
            )),
        }
    }

    /// Send a minimal request with `api_key`
    pub async fn test_connection(&self, api_key: &str) -> ConnectionStatus {
        if api_key.trim().is_empty() {
            return ConnectionStatus::failed("API key is empty");
        }
        match self.complete(api_key, PROBE_PROMPT, PROBE_MAX_TOKENS).await {
            Ok(_) => ConnectionStatus::ok(),
            Err(CopysmithError::Provider { message, .. }) => ConnectionStatus::failed(message),
            Err(e) => ConnectionStatus::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    fn client(transport: Arc<ScriptedTransport>) -> GenerationClient {
        let config = GenerationConfig {
            api_key: Some("sk-test".to_string()),
            ..GenerationConfig::default()
        };
        GenerationClient::new(transport, config)
    }

    #[tokio::test]
    async fn test_returns_first_text_segment() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(
            200,
            json!({"content": [{"type": "text", "text": "## Intro"}, {"type": "text", "text": "more"}]}),
        );

        let text = client(transport.clone()).generate_text("write").await.unwrap();
        assert_eq!(text, "## Intro");

        let request = &transport.requests()[0];
        assert_eq!(request.body["model"], "claude-3-opus-20240229");
        assert_eq!(request.body["max_tokens"], 4000);
        assert_eq!(request.body["messages"][0]["role"], "user");
        assert_eq!(request.body["messages"][0]["content"], "write");
        assert_eq!(request.header_value("x-api-key"), Some("sk-test"));
        assert_eq!(request.header_value("anthropic-version"), Some("2023-06-01"));
    }

    #[tokio::test]
    async fn test_error_payload_is_provider_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(
            400,
            json!({"type": "error", "error": {"type": "invalid_request_error", "message": "max_tokens too large"}}),
        );

        let err = client(transport).generate_text("write").await.unwrap_err();
        match err {
            CopysmithError::Provider { message, status, .. } => {
                assert_eq!(message, "API error: max_tokens too large");
                assert_eq!(status, Some(400));
            }
            other => panic!("Expected Provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_failure("connection refused");

        let err = client(transport).generate_text("write").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let transport = Arc::new(ScriptedTransport::new());
        let generation = GenerationClient::new(transport.clone(), GenerationConfig::default());

        let err = generation.generate_text("write").await.unwrap_err();
        assert_eq!(err.kind(), "configuration");
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_content_is_provider_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"content": []}));

        let err = client(transport).generate_text("write").await.unwrap_err();
        assert_eq!(err.kind(), "provider");
    }

    #[tokio::test]
    async fn test_connection_probe_uses_small_budget() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, json!({"content": [{"text": "ok"}]}))
            .push_json(401, json!({"error": {"message": "invalid x-api-key"}}));

        let generation = client(transport.clone());
        assert!(generation.test_connection("sk-probe").await.success);

        let failed = generation.test_connection("bad").await;
        assert!(!failed.success);
        assert_eq!(failed.message, "API error: invalid x-api-key");

        let probe = &transport.requests()[0];
        assert_eq!(probe.body["max_tokens"], 10);
        assert_eq!(probe.header_value("x-api-key"), Some("sk-probe"));
    }
}
