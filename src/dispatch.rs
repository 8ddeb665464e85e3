//! Note generation dispatch
//!
//! Routes a prompt to the selected provider and folds provider failures into
//! the pipeline's error taxonomy.

use crate::api::{self, GENERATE_NOTES_PATH, GenerateNotesRequest, GenerateNotesResponse};
use crate::credentials::Credentials;
use crate::error::{ReleaseNotesError, Result};
use crate::log_debug;
use crate::prompt;
use crate::providers::{
    AnthropicClient, Model, OpenAiClient, ProviderClient, ProviderEndpoints, ProviderError,
};
use crate::types::GenerationRequest;
use async_trait::async_trait;
use reqwest::Client;

/// Something that turns a generation request into Markdown text
#[async_trait]
pub trait NotesBackend: Send + Sync {
    /// Whether generation runs in-process and therefore needs local API keys
    fn is_local(&self) -> bool;

    async fn generate(
        &self,
        request: &GenerationRequest,
        credentials: &Credentials,
    ) -> Result<String>;
}

fn missing_key_message(model: Model) -> String {
    format!("{} API key is required", model.provider_name())
}

/// Map a provider failure onto the pipeline error kinds
pub fn classify(error: ProviderError) -> ReleaseNotesError {
    if error.is_context_length_exceeded() {
        log_debug!("Provider rejected prompt as too long: {}", error);
        return ReleaseNotesError::token_limit();
    }
    ReleaseNotesError::Generation(error.to_string())
}

/// In-process dispatcher calling the provider APIs directly
#[derive(Debug, Clone, Default)]
pub struct NoteDispatcher {
    http: Client,
    endpoints: ProviderEndpoints,
}

impl NoteDispatcher {
    pub fn new(http: Client, endpoints: ProviderEndpoints) -> Self {
        Self { http, endpoints }
    }

    fn client_for(&self, model: Model, credentials: &Credentials) -> Result<Box<dyn ProviderClient>> {
        let api_key = credentials
            .api_key_for(model)
            .ok_or_else(|| ReleaseNotesError::ProviderConfig(missing_key_message(model)))?;

        Ok(match model {
            Model::Claude => Box::new(AnthropicClient::new(
                self.http.clone(),
                api_key,
                &self.endpoints.anthropic_api_url,
            )),
            Model::Gpt4oMini => Box::new(OpenAiClient::new(
                self.http.clone(),
                api_key,
                &self.endpoints.openai_api_url,
            )),
        })
    }
}

#[async_trait]
impl NotesBackend for NoteDispatcher {
    fn is_local(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        credentials: &Credentials,
    ) -> Result<String> {
        let prompt = prompt::build(request.source_type, &request.items);
        let client = self.client_for(request.model, credentials)?;

        log_debug!(
            "Generating {} notes from {} items with {}",
            request.source_type,
            request.items.len(),
            client.provider()
        );

        client.complete(&prompt).await.map_err(classify)
    }
}

/// Dispatcher that forwards generation to a proxy server
#[derive(Debug, Clone)]
pub struct ProxiedDispatcher {
    http: Client,
    base_url: String,
}

impl ProxiedDispatcher {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl NotesBackend for ProxiedDispatcher {
    fn is_local(&self) -> bool {
        false
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        credentials: &Credentials,
    ) -> Result<String> {
        let body = GenerateNotesRequest {
            source_type: request.source_type,
            model: request.model,
            data: request.items.clone(),
            openai_key: credentials.api_key_for(Model::Gpt4oMini).map(str::to_string),
            anthropic_key: credentials.api_key_for(Model::Claude).map(str::to_string),
        };

        let response: GenerateNotesResponse = api::post_json(
            &self.http,
            &format!("{}{}", self.base_url, GENERATE_NOTES_PATH),
            &body,
            ReleaseNotesError::Generation,
        )
        .await?;

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_length_becomes_token_limit() {
        let error = classify(ProviderError::ContextLengthExceeded {
            provider: "OpenAI",
            message: "too long".to_string(),
        });
        assert_eq!(error, ReleaseNotesError::token_limit());
    }

    #[test]
    fn test_other_provider_errors_become_generation() {
        let error = classify(ProviderError::EmptyResponse {
            provider: "Anthropic",
        });
        assert_eq!(error.code(), "generation");
        assert!(error.to_string().contains("Anthropic returned no text content"));
    }

    #[test]
    fn test_missing_key_messages() {
        assert_eq!(missing_key_message(Model::Claude), "Anthropic API key is required");
        assert_eq!(missing_key_message(Model::Gpt4oMini), "OpenAI API key is required");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let dispatcher = NoteDispatcher::default();
        let request = GenerationRequest::new(
            crate::types::SourceType::Commits,
            Model::Claude,
            vec![crate::types::NoteItem::message("fix: null check")],
        );

        let error = dispatcher
            .generate(&request, &Credentials::default())
            .await
            .expect_err("missing key");
        assert_eq!(
            error,
            ReleaseNotesError::ProviderConfig("Anthropic API key is required".to_string())
        );
    }
}
