//! One release-notes submission from form input to Markdown
//!
//! Validation happens before any network access. The visibility check
//! decides whether commits are fetched at all.

use crate::config::{Config, GatewayMode};
use crate::credentials::Credentials;
use crate::dispatch::{NoteDispatcher, NotesBackend, ProxiedDispatcher};
use crate::error::{ReleaseNotesError, Result};
use crate::github::{DateWindow, DirectGateway, ProxiedGateway, RepositoryGateway};
use crate::log_debug;
use crate::providers::Model;
use crate::repository::{self, RepositoryReference};
use crate::types::{GenerationRequest, MarkdownReleaseNotes, NoteItem, SourceType};
use chrono::NaiveDate;
use std::sync::Arc;

/// User input for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub repository_url: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub source_type: SourceType,
    pub model: Model,
}

/// Progress reported while a submission runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    CheckingVisibility(RepositoryReference),
    FetchingCommits(SourceType),
    Generating { items: usize, model: Model },
}

impl Stage {
    pub fn describe(&self) -> String {
        match self {
            Self::CheckingVisibility(repo) => format!("Checking access to {repo}..."),
            Self::FetchingCommits(SourceType::Commits) => "Fetching commits...".to_string(),
            Self::FetchingCommits(SourceType::Diffs) => "Fetching commits and diffs...".to_string(),
            Self::Generating { items, model } => {
                format!("Generating release notes from {items} commits with {model}...")
            }
        }
    }
}

/// Locator, gateway and dispatcher wired together
#[derive(Clone)]
pub struct ReleaseNotesPipeline {
    gateway: Arc<dyn RepositoryGateway>,
    backend: Arc<dyn NotesBackend>,
}

impl ReleaseNotesPipeline {
    pub fn new(gateway: Arc<dyn RepositoryGateway>, backend: Arc<dyn NotesBackend>) -> Self {
        Self { gateway, backend }
    }

    /// Build the pipeline for the configured gateway mode
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        match config.gateway.mode {
            GatewayMode::Direct => Self::new(
                Arc::new(
                    DirectGateway::new(http.clone())
                        .with_api_url(&config.gateway.github_api_url)
                        .with_max_concurrent_diffs(config.gateway.max_concurrent_diffs),
                ),
                Arc::new(NoteDispatcher::new(http, config.providers.clone())),
            ),
            GatewayMode::Proxy => Self::new(
                Arc::new(ProxiedGateway::new(http.clone(), &config.gateway.proxy_url)),
                Arc::new(ProxiedDispatcher::new(http, &config.gateway.proxy_url)),
            ),
        }
    }

    pub async fn run(
        &self,
        submission: &Submission,
        credentials: &Credentials,
    ) -> Result<MarkdownReleaseNotes> {
        self.run_with_progress(submission, credentials, |_| {}).await
    }

    pub async fn run_with_progress<F>(
        &self,
        submission: &Submission,
        credentials: &Credentials,
        progress: F,
    ) -> Result<MarkdownReleaseNotes>
    where
        F: Fn(Stage) + Send + Sync,
    {
        let (Some(start), Some(end)) = (submission.start_date, submission.end_date) else {
            return Err(ReleaseNotesError::Validation(
                "Please select both start and end dates".to_string(),
            ));
        };
        let window = DateWindow::from_dates(start, end)?;

        let repo = repository::parse(&submission.repository_url).ok_or_else(|| {
            ReleaseNotesError::Validation("Invalid GitHub repository URL".to_string())
        })?;

        if self.backend.is_local() && credentials.api_key_for(submission.model).is_none() {
            return Err(ReleaseNotesError::Validation(format!(
                "Please provide your {} API key ({})",
                submission.model.provider_name(),
                submission.model.api_key_env()
            )));
        }

        progress(Stage::CheckingVisibility(repo.clone()));
        let visibility = self.gateway.check_visibility(&repo, credentials).await;
        if visibility.is_private && credentials.github_token().is_none() {
            // Private metadata read cleanly by a proxy means the proxy has a token
            let proxy_can_read = self.gateway.is_remote() && visibility.error.is_none();
            if !proxy_can_read {
                return Err(ReleaseNotesError::PrivateRepoAuthRequired);
            }
        }
        if let Some(error) = visibility.error {
            return Err(ReleaseNotesError::VisibilityCheck(error));
        }

        progress(Stage::FetchingCommits(submission.source_type));
        let items: Vec<NoteItem> = match submission.source_type {
            SourceType::Commits => self
                .gateway
                .fetch_commits(&repo, &window, credentials)
                .await?
                .into_iter()
                .map(NoteItem::from)
                .collect(),
            SourceType::Diffs => self
                .gateway
                .fetch_commit_diffs(&repo, &window, credentials)
                .await?
                .into_iter()
                .map(NoteItem::from)
                .collect(),
        };

        if items.is_empty() {
            return Err(ReleaseNotesError::Validation(
                "No commits found in the selected date range".to_string(),
            ));
        }
        log_debug!("Collected {} items from {}", items.len(), repo);

        progress(Stage::Generating {
            items: items.len(),
            model: submission.model,
        });
        let request = GenerationRequest::new(submission.source_type, submission.model, items);
        let content = self.backend.generate(&request, credentials).await?;

        Ok(MarkdownReleaseNotes::new(content))
    }
}
