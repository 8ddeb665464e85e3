//! release-scribe - AI-generated release notes from GitHub commit history
//!
//! This library resolves a GitHub repository, fetches its commits (or commits
//! and diffs) for a date range, and asks an LLM provider to write Markdown
//! release notes. The same operations are available over HTTP through the
//! proxy endpoint in [`server`].

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod github;
pub mod logger;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod repository;
pub mod server;
pub mod types;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use credentials::{CredentialKey, CredentialStore, Credentials};
pub use error::{ReleaseNotesError, Result};
pub use pipeline::{ReleaseNotesPipeline, Submission};
pub use providers::Model;
pub use repository::RepositoryReference;

// Re-exports from types module
pub use types::{GenerationRequest, MarkdownReleaseNotes, NoteItem, SourceType};
