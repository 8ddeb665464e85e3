//! Value types shared across the pipeline
//!
//! - Commit records and the message/diff shapes the gateway returns
//! - Generation requests (source type, model, items)
//! - Markdown release notes and their terminal rendering

mod commit;
mod generation;
mod markdown;
mod release_notes;

pub use commit::{CommitDiff, CommitMessage, CommitRecord, CommitWithDiff, NoteItem};
pub use generation::{GenerationRequest, ParseSourceTypeError, SourceType};
pub use markdown::render_markdown_for_terminal;
pub use release_notes::MarkdownReleaseNotes;
