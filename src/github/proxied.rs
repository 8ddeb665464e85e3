//! Repository access through the release-scribe proxy endpoint

use super::{DateWindow, RepoVisibility, RepositoryGateway};
use crate::api::{
    self, COMMIT_DIFFS_PATH, COMMITS_PATH, CommitsRequest, CommitsResponse, VISIBILITY_PATH,
    VisibilityRequest,
};
use crate::credentials::Credentials;
use crate::error::{ReleaseNotesError, Result};
use crate::repository::RepositoryReference;
use crate::types::{CommitDiff, CommitMessage};
use async_trait::async_trait;
use reqwest::Client;

/// Gateway that forwards every operation to a proxy server
#[derive(Debug, Clone)]
pub struct ProxiedGateway {
    http: Client,
    base_url: String,
}

impl ProxiedGateway {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn commits_request(
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> CommitsRequest {
        CommitsRequest {
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
            start_date: window.since_param(),
            end_date: window.until_param(),
            github_token: credentials.github_token().map(str::to_string),
        }
    }
}

#[async_trait]
impl RepositoryGateway for ProxiedGateway {
    fn is_remote(&self) -> bool {
        true
    }

    async fn check_visibility(
        &self,
        repo: &RepositoryReference,
        credentials: &Credentials,
    ) -> RepoVisibility {
        let request = VisibilityRequest {
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
            github_token: credentials.github_token().map(str::to_string),
        };

        api::post_json(
            &self.http,
            &self.url(VISIBILITY_PATH),
            &request,
            ReleaseNotesError::VisibilityCheck,
        )
        .await
        .unwrap_or_else(|e| RepoVisibility::failed(false, e.detail()))
    }

    async fn fetch_commits(
        &self,
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitMessage>> {
        let response: CommitsResponse<CommitMessage> = api::post_json(
            &self.http,
            &self.url(COMMITS_PATH),
            &Self::commits_request(repo, window, credentials),
            ReleaseNotesError::Fetch,
        )
        .await?;
        Ok(response.commits)
    }

    async fn fetch_commit_diffs(
        &self,
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitDiff>> {
        let response: CommitsResponse<CommitDiff> = api::post_json(
            &self.http,
            &self.url(COMMIT_DIFFS_PATH),
            &Self::commits_request(repo, window, credentials),
            ReleaseNotesError::Fetch,
        )
        .await?;
        Ok(response.commits)
    }
}
