//! Proxy endpoint handlers

use super::AppState;
use super::error::ApiError;
use crate::api::{
    CommitsRequest, CommitsResponse, GenerateNotesRequest, GenerateNotesResponse,
    VisibilityRequest,
};
use crate::credentials::Credentials;
use crate::error::ReleaseNotesError;
use crate::github::{DateWindow, RepoVisibility};
use crate::repository::RepositoryReference;
use crate::types::{CommitDiff, CommitMessage, GenerationRequest};
use axum::{Json, extract::State, extract::rejection::JsonRejection};

type Payload<T> = Result<Json<T>, JsonRejection>;

fn repository(owner: &str, repo: &str) -> Result<RepositoryReference, ReleaseNotesError> {
    RepositoryReference::new(owner, repo).ok_or_else(|| {
        ReleaseNotesError::Validation("Invalid GitHub repository owner or name".to_string())
    })
}

fn github_credentials(token: Option<String>) -> Credentials {
    Credentials {
        github_token: token,
        ..Credentials::default()
    }
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn visibility(
    State(state): State<AppState>,
    payload: Payload<VisibilityRequest>,
) -> Result<Json<RepoVisibility>, ApiError> {
    let Json(request) = payload?;
    let repo = repository(&request.owner, &request.repo)?;
    let credentials = state.resolve(github_credentials(request.github_token));

    Ok(Json(state.gateway.check_visibility(&repo, &credentials).await))
}

pub async fn commits(
    State(state): State<AppState>,
    payload: Payload<CommitsRequest>,
) -> Result<Json<CommitsResponse<CommitMessage>>, ApiError> {
    let Json(request) = payload?;
    let repo = repository(&request.owner, &request.repo)?;
    let window = DateWindow::parse(&request.start_date, &request.end_date)?;
    let credentials = state.resolve(github_credentials(request.github_token));

    let commits = state
        .gateway
        .fetch_commits(&repo, &window, &credentials)
        .await?;
    Ok(Json(CommitsResponse { commits }))
}

pub async fn commit_diffs(
    State(state): State<AppState>,
    payload: Payload<CommitsRequest>,
) -> Result<Json<CommitsResponse<CommitDiff>>, ApiError> {
    let Json(request) = payload?;
    let repo = repository(&request.owner, &request.repo)?;
    let window = DateWindow::parse(&request.start_date, &request.end_date)?;
    let credentials = state.resolve(github_credentials(request.github_token));

    let commits = state
        .gateway
        .fetch_commit_diffs(&repo, &window, &credentials)
        .await?;
    Ok(Json(CommitsResponse { commits }))
}

pub async fn generate_notes(
    State(state): State<AppState>,
    payload: Payload<GenerateNotesRequest>,
) -> Result<Json<GenerateNotesResponse>, ApiError> {
    let Json(request) = payload?;
    let credentials = state.resolve(Credentials {
        github_token: None,
        openai_api_key: request.openai_key,
        anthropic_api_key: request.anthropic_key,
    });

    let generation = GenerationRequest::new(request.source_type, request.model, request.data);
    let content = state.backend.generate(&generation, &credentials).await?;
    Ok(Json(GenerateNotesResponse { content }))
}
