//! OpenAI chat-completions client

use super::{Model, ProviderClient, ProviderError};
use crate::log_debug;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub(super) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "OpenAI";
const MODEL: &str = Model::Gpt4oMini.api_model();
const TEMPERATURE: f32 = 0.7;

/// Client for the OpenAI chat-completions endpoint
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// OpenAI reports an oversized prompt with the `context_length_exceeded` code.
/// Older responses only carry it in the message text.
fn is_context_length_exceeded(code: Option<&str>, message: &str) -> bool {
    let message = message.to_lowercase();
    code == Some("context_length_exceeded")
        || message.contains("maximum context length")
        || message.contains("context length exceeded")
}

fn classify_error(status: StatusCode, body: &str) -> ProviderError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) => (None, body.to_string()),
    };

    if is_context_length_exceeded(code.as_deref(), &message) {
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
impl ProviderClient for OpenAiClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: MODEL,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        log_debug!("Sending {} prompt characters to {}", prompt.len(), MODEL);

        let transport = |source| ProviderError::Transport {
            provider: PROVIDER,
            source,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            log_debug!("OpenAI returned {}: {}", status, text);
            return Err(classify_error(status, &text));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse { provider: PROVIDER })
    }
}
