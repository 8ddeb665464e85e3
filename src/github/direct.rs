//! Direct GitHub REST API access

use super::{DateWindow, RepoVisibility, RepositoryGateway};
use crate::credentials::Credentials;
use crate::error::{REPO_NOT_FOUND_MESSAGE, ReleaseNotesError, Result};
use crate::log_debug;
use crate::repository::RepositoryReference;
use crate::types::{CommitDiff, CommitMessage, CommitRecord, CommitWithDiff};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_MAX_CONCURRENT_DIFFS: usize = 8;

const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const CLIENT_NAME: &str = concat!("release-scribe/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    private: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitDetail,
    #[serde(default)]
    author: Option<GitHubUser>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitDetail {
    message: String,
    #[serde(default)]
    author: Option<GitHubGitAuthor>,
}

#[derive(Debug, Deserialize)]
struct GitHubGitAuthor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

impl From<GitHubCommit> for CommitRecord {
    fn from(commit: GitHubCommit) -> Self {
        let git_author = commit.commit.author;
        let author = commit
            .author
            .map(|user| user.login)
            .or_else(|| git_author.as_ref().and_then(|a| a.name.clone()))
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            sha: commit.sha,
            message: commit.commit.message,
            date: git_author.and_then(|a| a.date).unwrap_or_default(),
            author,
        }
    }
}

/// Status text for a failed response, e.g. "Not Found"
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}

fn fetch_error(error: &reqwest::Error) -> ReleaseNotesError {
    ReleaseNotesError::Fetch(error.to_string())
}

/// Gateway backed by the GitHub REST API
#[derive(Debug, Clone)]
pub struct DirectGateway {
    http: Client,
    api_url: String,
    max_concurrent_diffs: usize,
}

impl Default for DirectGateway {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl DirectGateway {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            api_url: DEFAULT_API_URL.to_string(),
            max_concurrent_diffs: DEFAULT_MAX_CONCURRENT_DIFFS,
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Width of the diff fetch window; clamped to at least 1
    #[must_use]
    pub fn with_max_concurrent_diffs(mut self, width: usize) -> Self {
        self.max_concurrent_diffs = width.max(1);
        self
    }

    pub fn max_concurrent_diffs(&self) -> usize {
        self.max_concurrent_diffs
    }

    fn repo_url(&self, repo: &RepositoryReference) -> String {
        format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.name)
    }

    fn get(&self, url: &str, credentials: &Credentials, accept: &str) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .header(ACCEPT, accept)
            .header(USER_AGENT, CLIENT_NAME);

        match credentials.github_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_checked(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| fetch_error(&e))?;
        let status = response.status();
        if !status.is_success() {
            log_debug!("GitHub request failed: {}", status);
            return Err(ReleaseNotesError::Fetch(status_text(status)));
        }
        Ok(response)
    }

    /// Full commit records in the window, in API order
    pub async fn list_commits(
        &self,
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitRecord>> {
        let url = format!("{}/commits", self.repo_url(repo));
        let request = self
            .get(&url, credentials, JSON_MEDIA_TYPE)
            .query(&[("since", window.since_param()), ("until", window.until_param())]);

        let commits: Vec<GitHubCommit> = Self::send_checked(request)
            .await?
            .json()
            .await
            .map_err(|e| fetch_error(&e))?;

        log_debug!("Fetched {} commits for {}", commits.len(), repo);
        Ok(commits.into_iter().map(CommitRecord::from).collect())
    }

    /// Raw unified diff of one commit
    pub async fn fetch_diff(
        &self,
        repo: &RepositoryReference,
        sha: &str,
        credentials: &Credentials,
    ) -> Result<String> {
        let url = format!("{}/commits/{}", self.repo_url(repo), sha);
        Self::send_checked(self.get(&url, credentials, DIFF_MEDIA_TYPE))
            .await?
            .text()
            .await
            .map_err(|e| fetch_error(&e))
    }

    /// Commit records with their diffs. At most `max_concurrent_diffs` diff
    /// requests are in flight; output keeps commit-list order and the first
    /// failure fails the batch.
    pub async fn fetch_commits_with_diffs(
        &self,
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitWithDiff>> {
        let commits = self.list_commits(repo, window, credentials).await?;

        stream::iter(commits)
            .map(|commit| async move {
                let diff = self.fetch_diff(repo, &commit.sha, credentials).await?;
                Ok::<_, ReleaseNotesError>(commit.with_diff(diff))
            })
            .buffered(self.max_concurrent_diffs)
            .try_collect()
            .await
    }
}

#[async_trait]
impl RepositoryGateway for DirectGateway {
    async fn check_visibility(
        &self,
        repo: &RepositoryReference,
        credentials: &Credentials,
    ) -> RepoVisibility {
        let request = self.get(&self.repo_url(repo), credentials, JSON_MEDIA_TYPE);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return RepoVisibility::failed(false, e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return RepoVisibility::failed(true, REPO_NOT_FOUND_MESSAGE);
        }
        if !status.is_success() {
            return RepoVisibility::failed(
                false,
                ReleaseNotesError::Fetch(status_text(status)).to_string(),
            );
        }

        match response.json::<GitHubRepo>().await {
            Ok(metadata) if metadata.private => RepoVisibility::private(),
            Ok(_) => RepoVisibility::public(),
            Err(e) => RepoVisibility::failed(false, e.to_string()),
        }
    }

    async fn fetch_commits(
        &self,
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitMessage>> {
        let commits = self.list_commits(repo, window, credentials).await?;
        Ok(commits.into_iter().map(CommitMessage::from).collect())
    }

    async fn fetch_commit_diffs(
        &self,
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitDiff>> {
        let commits = self
            .fetch_commits_with_diffs(repo, window, credentials)
            .await?;
        Ok(commits.into_iter().map(CommitDiff::from).collect())
    }
}
