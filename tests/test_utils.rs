#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use release_scribe::credentials::Credentials;
use release_scribe::dispatch::NotesBackend;
use release_scribe::error::{ReleaseNotesError, Result};
use release_scribe::github::{DateWindow, RepoVisibility, RepositoryGateway};
use release_scribe::repository::RepositoryReference;
use release_scribe::types::{CommitDiff, CommitMessage, GenerationRequest};
use serde_json::{Value, json};

/// GitHub commit list entry as returned by `GET /repos/{owner}/{repo}/commits`
pub fn github_commit(sha: &str, message: &str) -> Value {
    json!({
        "sha": sha,
        "commit": {
            "message": message,
            "author": { "name": "Test User", "date": "2024-01-15T10:00:00Z" }
        },
        "author": { "login": "test-user" }
    })
}

/// In-memory gateway that records which operations ran
pub struct StubGateway {
    pub visibility: RepoVisibility,
    pub commits: Vec<CommitMessage>,
    pub diffs: Vec<CommitDiff>,
    pub fetch_error: Option<ReleaseNotesError>,
    pub calls: Mutex<Vec<String>>,
    pub seen_tokens: Mutex<Vec<Option<String>>>,
}

impl Default for StubGateway {
    fn default() -> Self {
        Self {
            visibility: RepoVisibility::public(),
            commits: vec![
                CommitMessage {
                    message: "feat: add dark mode".to_string(),
                },
                CommitMessage {
                    message: "fix: null check".to_string(),
                },
            ],
            diffs: vec![CommitDiff {
                message: "feat: add dark mode".to_string(),
                diff: "+theme = dark".to_string(),
            }],
            fetch_error: None,
            calls: Mutex::new(Vec::new()),
            seen_tokens: Mutex::new(Vec::new()),
        }
    }
}

impl StubGateway {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: &str, credentials: &Credentials) {
        self.calls.lock().push(call.to_string());
        self.seen_tokens
            .lock()
            .push(credentials.github_token().map(str::to_string));
    }
}

#[async_trait]
impl RepositoryGateway for StubGateway {
    async fn check_visibility(
        &self,
        _repo: &RepositoryReference,
        credentials: &Credentials,
    ) -> RepoVisibility {
        self.record("visibility", credentials);
        self.visibility.clone()
    }

    async fn fetch_commits(
        &self,
        _repo: &RepositoryReference,
        _window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitMessage>> {
        self.record("commits", credentials);
        match &self.fetch_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.commits.clone()),
        }
    }

    async fn fetch_commit_diffs(
        &self,
        _repo: &RepositoryReference,
        _window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitDiff>> {
        self.record("diffs", credentials);
        match &self.fetch_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.diffs.clone()),
        }
    }
}

/// Backend that returns a canned reply and records what it was asked
pub struct StubBackend {
    pub local: bool,
    pub reply: std::result::Result<String, ReleaseNotesError>,
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub credentials: Mutex<Vec<Credentials>>,
}

impl StubBackend {
    pub fn replying(content: &str) -> Self {
        Self {
            local: true,
            reply: Ok(content.to_string()),
            requests: Mutex::new(Vec::new()),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ReleaseNotesError) -> Self {
        Self {
            reply: Err(error),
            ..Self::replying("")
        }
    }

    pub fn remote(mut self) -> Self {
        self.local = false;
        self
    }
}

#[async_trait]
impl NotesBackend for StubBackend {
    fn is_local(&self) -> bool {
        self.local
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        credentials: &Credentials,
    ) -> Result<String> {
        self.requests.lock().push(request.clone());
        self.credentials.lock().push(credentials.clone());
        self.reply.clone()
    }
}
