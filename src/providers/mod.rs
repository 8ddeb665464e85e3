//! LLM provider selection and clients.
//!
//! Single source of truth for the supported models and their defaults, plus
//! the [`ProviderClient`] capability each provider implements.

mod anthropic;
mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model selection offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "claude")]
    Claude,
}

impl Model {
    /// All available models
    pub const ALL: &'static [Model] = &[Model::Gpt4oMini, Model::Claude];

    /// Model name as used in config files, the CLI and the proxy API
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Claude => "claude",
        }
    }

    /// Human-readable provider name
    pub const fn provider_name(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "OpenAI",
            Self::Claude => "Anthropic",
        }
    }

    /// Model identifier sent to the provider API
    pub const fn api_model(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Claude => "claude-3-5-haiku-20241022",
        }
    }

    /// Environment variable / credential name for the API key
    pub const fn api_key_env(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "OPENAI_API_KEY",
            Self::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

impl FromStr for Model {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        // Accept provider names as aliases
        let normalized = match lower.as_str() {
            "openai" => "gpt-4o-mini",
            "anthropic" => "claude",
            other => other,
        };

        Self::ALL
            .iter()
            .find(|m| m.name() == normalized)
            .copied()
            .ok_or_else(|| ParseModelError(s.to_string()))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown model: {0}. Supported: gpt-4o-mini, claude")]
pub struct ParseModelError(String);

/// Base URLs of the provider APIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub openai_api_url: String,
    pub anthropic_api_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai_api_url: openai::DEFAULT_BASE_URL.to_string(),
            anthropic_api_url: anthropic::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// A provider that turns a prompt into completion text
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider name for logs and error messages
    fn provider(&self) -> &'static str;

    /// Send `prompt` as a single user message and return the text reply
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Failure reported by a provider client
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} rejected the prompt as too long: {message}")]
    ContextLengthExceeded {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned no text content")]
    EmptyResponse { provider: &'static str },

    #[error("Failed to parse {provider} response: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn is_context_length_exceeded(&self) -> bool {
        matches!(self, Self::ContextLengthExceeded { .. })
    }
}
