//! Repository access: visibility checks and commit/diff retrieval
//!
//! [`DirectGateway`] talks to the GitHub REST API. [`ProxiedGateway`] routes
//! the same operations through the release-scribe proxy endpoint.

mod direct;
mod proxied;

pub use direct::{DEFAULT_API_URL, DEFAULT_MAX_CONCURRENT_DIFFS, DirectGateway};
pub use proxied::ProxiedGateway;

use crate::credentials::Credentials;
use crate::error::{ReleaseNotesError, Result};
use crate::repository::RepositoryReference;
use crate::types::{CommitDiff, CommitMessage};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a repository metadata lookup. Never an error by itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoVisibility {
    pub is_private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepoVisibility {
    pub fn public() -> Self {
        Self {
            is_private: false,
            error: None,
        }
    }

    pub fn private() -> Self {
        Self {
            is_private: true,
            error: None,
        }
    }

    pub fn failed(is_private: bool, error: impl Into<String>) -> Self {
        Self {
            is_private,
            error: Some(error.into()),
        }
    }
}

/// Inclusive UTC interval used to filter commits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    since: DateTime<Utc>,
    until: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Self> {
        if since > until {
            return Err(ReleaseNotesError::Validation(
                "Start date must not be after end date".to_string(),
            ));
        }
        Ok(Self { since, until })
    }

    /// Whole calendar days: start of `start` through the last second of `end`
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(start_of_day(start), end_of_day(end))
    }

    /// Parse window bounds given as RFC 3339 timestamps or `YYYY-MM-DD` dates
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_bound(start, false)?, parse_bound(end, true)?)
    }

    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    pub fn until(&self) -> DateTime<Utc> {
        self.until
    }

    pub fn since_param(&self) -> String {
        self.since.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn until_param(&self) -> String {
        self.until.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    date.and_time(last_second).and_utc()
}

fn parse_bound(value: &str, end: bool) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| if end { end_of_day(date) } else { start_of_day(date) })
        .map_err(|_| ReleaseNotesError::Validation(format!("Invalid date: {value}")))
}

/// Read access to a hosted repository
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// Whether requests go through a server that may hold its own GitHub token
    fn is_remote(&self) -> bool {
        false
    }

    /// Report whether the repository is private; failures land in `error`
    async fn check_visibility(
        &self,
        repo: &RepositoryReference,
        credentials: &Credentials,
    ) -> RepoVisibility;

    /// Commit messages in the window, in the order GitHub returns them
    async fn fetch_commits(
        &self,
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitMessage>>;

    /// Commit messages paired with their diffs, in commit-list order
    async fn fetch_commit_diffs(
        &self,
        repo: &RepositoryReference,
        window: &DateWindow,
        credentials: &Credentials,
    ) -> Result<Vec<CommitDiff>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_window_covers_whole_days() {
        let window = DateWindow::from_dates(date(2024, 1, 1), date(2024, 1, 31)).expect("valid");
        assert_eq!(window.since_param(), "2024-01-01T00:00:00Z");
        assert_eq!(window.until_param(), "2024-01-31T23:59:59Z");
    }

    #[test]
    fn test_single_day_window_is_valid() {
        let window = DateWindow::from_dates(date(2024, 3, 5), date(2024, 3, 5)).expect("valid");
        assert!(window.since() < window.until());
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let error = DateWindow::from_dates(date(2024, 2, 1), date(2024, 1, 1))
            .expect_err("reversed window");
        assert_eq!(error.code(), "validation");
    }

    #[test]
    fn test_parse_accepts_dates_and_timestamps() {
        let window = DateWindow::parse("2024-01-01", "2024-01-02T12:00:00+02:00").expect("valid");
        assert_eq!(window.since_param(), "2024-01-01T00:00:00Z");
        assert_eq!(window.until_param(), "2024-01-02T10:00:00Z");

        let window = DateWindow::parse("2024-01-01T00:00:00.000Z", "2024-01-02").expect("valid");
        assert_eq!(window.until_param(), "2024-01-02T23:59:59Z");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DateWindow::parse("yesterday", "2024-01-02").is_err());
    }

    #[test]
    fn test_visibility_wire_shape() {
        let json = serde_json::to_value(RepoVisibility::failed(true, "nope")).expect("serializes");
        assert_eq!(json["isPrivate"], true);
        assert_eq!(json["error"], "nope");

        let json = serde_json::to_string(&RepoVisibility::public()).expect("serializes");
        assert_eq!(json, r#"{"isPrivate":false}"#);
    }
}
