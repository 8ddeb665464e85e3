//! Anthropic messages client

use super::{Model, ProviderClient, ProviderError};
use crate::log_debug;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub(super) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const PROVIDER: &str = "Anthropic";
const MODEL: &str = Model::Claude.api_model();
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4000;

/// Client for the Anthropic messages endpoint
pub struct AnthropicClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

fn is_context_length_exceeded(kind: &str, message: &str) -> bool {
    let message = message.to_lowercase();
    (kind == "invalid_request_error" && message.contains("prompt is too long"))
        || kind == "request_too_large"
        || message.contains("context length exceeded")
}

fn classify_error(status: StatusCode, body: &str) -> ProviderError {
    let (kind, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.kind, envelope.error.message),
        Err(_) => (String::new(), body.to_string()),
    };

    if is_context_length_exceeded(&kind, &message) {
        return ProviderError::ContextLengthExceeded {
            provider: PROVIDER,
            message,
        };
    }

    ProviderError::Api {
        provider: PROVIDER,
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        log_debug!("Sending {} prompt characters to {}", prompt.len(), MODEL);

        let transport = |source| ProviderError::Transport {
            provider: PROVIDER,
            source,
        };

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            log_debug!("Anthropic returned {}: {}", status, text);
            return Err(classify_error(status, &text));
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse { provider: PROVIDER })
    }
}
