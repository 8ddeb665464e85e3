//! Commit data flowing from the gateway into the prompt builder

use serde::{Deserialize, Serialize};

/// A commit as reported by the GitHub commits API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    /// Author date as reported by GitHub (RFC 3339)
    pub date: String,
    pub author: String,
}

impl CommitRecord {
    /// First line of the commit message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    pub fn with_diff(self, diff: String) -> CommitWithDiff {
        CommitWithDiff { commit: self, diff }
    }
}

/// A commit paired with its raw unified diff
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitWithDiff {
    #[serde(flatten)]
    pub commit: CommitRecord,
    pub diff: String,
}

/// Message-only commit shape returned for the "commits" source type
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub message: String,
}

/// Message plus diff shape returned for the "diffs" source type
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitDiff {
    pub message: String,
    pub diff: String,
}

impl From<CommitRecord> for CommitMessage {
    fn from(record: CommitRecord) -> Self {
        Self {
            message: record.message,
        }
    }
}

impl From<CommitWithDiff> for CommitDiff {
    fn from(value: CommitWithDiff) -> Self {
        Self {
            message: value.commit.message,
            diff: value.diff,
        }
    }
}

/// One prompt input: a commit message and, for diff-based notes, its diff
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl NoteItem {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diff: None,
        }
    }

    pub fn with_diff(message: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diff: Some(diff.into()),
        }
    }
}

impl From<CommitMessage> for NoteItem {
    fn from(commit: CommitMessage) -> Self {
        Self::message(commit.message)
    }
}

impl From<CommitDiff> for NoteItem {
    fn from(commit: CommitDiff) -> Self {
        Self::with_diff(commit.message, commit.diff)
    }
}
