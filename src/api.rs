//! Proxy endpoint wire format
//!
//! Shared by the axum server and the proxied gateway/dispatcher clients.
//! Field names are camelCase to match browser callers.

use crate::error::{ReleaseNotesError, Result};
use crate::log_debug;
use crate::providers::Model;
use crate::types::{NoteItem, SourceType};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const VISIBILITY_PATH: &str = "/api/github/visibility";
pub const COMMITS_PATH: &str = "/api/github/commits";
pub const COMMIT_DIFFS_PATH: &str = "/api/github/commit-diffs";
pub const GENERATE_NOTES_PATH: &str = "/api/generate-notes";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRequest {
    pub owner: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitsRequest {
    pub owner: String,
    pub repo: String,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub start_date: String,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitsResponse<T> {
    pub commits: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateNotesRequest {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub model: Model,
    pub data: Vec<NoteItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateNotesResponse {
    pub content: String,
}

/// Body of every non-2xx proxy response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl From<&ReleaseNotesError> for ErrorBody {
    fn from(error: &ReleaseNotesError) -> Self {
        Self {
            error: error.to_string(),
            code: error.code().to_string(),
        }
    }
}

impl From<ErrorBody> for ReleaseNotesError {
    fn from(body: ErrorBody) -> Self {
        Self::from_code(&body.code, body.error)
    }
}

/// POST `body` to a proxy endpoint and decode the success payload.
///
/// Error bodies are mapped back through their `code`; anything else goes
/// through `fallback`.
pub(crate) async fn post_json<B, T>(
    http: &Client,
    url: &str,
    body: &B,
    fallback: fn(String) -> ReleaseNotesError,
) -> Result<T>
where
    B: Serialize + Sync,
    T: DeserializeOwned,
{
    log_debug!("POST {}", url);

    let response = http
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| fallback(e.to_string()))?;

    let status = response.status();
    let text = response.text().await.map_err(|e| fallback(e.to_string()))?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(error) => error.into(),
            Err(_) => fallback(
                status
                    .canonical_reason()
                    .map_or_else(|| status.to_string(), str::to_string),
            ),
        });
    }

    serde_json::from_str(&text).map_err(|e| fallback(format!("Invalid proxy response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_uses_wire_names() {
        let request = GenerateNotesRequest {
            source_type: SourceType::Diffs,
            model: Model::Claude,
            data: vec![NoteItem::with_diff("feat: add X", "+x")],
            openai_key: None,
            anthropic_key: Some("sk-ant".to_string()),
        };

        let json = serde_json::to_value(&request).expect("serializes");
        assert_eq!(json["type"], "diffs");
        assert_eq!(json["model"], "claude");
        assert_eq!(json["data"][0]["diff"], "+x");
        assert_eq!(json["anthropicKey"], "sk-ant");
        assert!(json.get("openaiKey").is_none());
    }

    #[test]
    fn test_commits_request_reads_camel_case() {
        let request: CommitsRequest = serde_json::from_str(
            r#"{"owner":"acme","repo":"widgets","startDate":"2024-01-01","endDate":"2024-01-31"}"#,
        )
        .expect("deserializes");
        assert_eq!(request.start_date, "2024-01-01");
        assert_eq!(request.github_token, None);
    }

    #[test]
    fn test_error_body_round_trips_kind() {
        let body = ErrorBody::from(&ReleaseNotesError::token_limit());
        assert_eq!(body.code, "token_limit");
        assert!(ReleaseNotesError::from(body).is_token_limit());
    }
}
