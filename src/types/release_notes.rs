//! Release notes output
//!
//! The model decides the structure of the notes; this type only carries the
//! Markdown and knows how to present it.

use super::markdown::render_markdown_for_terminal;
use anyhow::{Context, Result};
use arboard::Clipboard;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Markdown release notes as returned by the model
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarkdownReleaseNotes {
    /// The full markdown content of the release notes
    pub content: String,
}

impl MarkdownReleaseNotes {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Render the markdown content with terminal styling
    pub fn format(&self) -> String {
        render_markdown_for_terminal(&self.content)
    }

    /// Get the raw markdown content (for file output, etc.)
    pub fn raw_content(&self) -> &str {
        &self.content
    }

    /// Copy the raw markdown to the system clipboard
    pub fn copy_to_clipboard(&self) -> Result<()> {
        let mut clipboard = Clipboard::new().context("Clipboard unavailable")?;
        clipboard
            .set_text(self.content.clone())
            .context("Failed to copy release notes to clipboard")
    }

    /// Write the raw markdown to a file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.content)
            .with_context(|| format!("Failed to write release notes to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_to_keeps_raw_markdown() {
        let dir = TempDir::new().expect("Failed to create temporary directory");
        let path = dir.path().join("RELEASE_NOTES.md");
        let notes = MarkdownReleaseNotes::new("## 🐛 Fixes\n\n- fix: null check\n");

        notes.write_to(&path).expect("Failed to write notes");

        let written = fs::read_to_string(&path).expect("Failed to read notes");
        assert_eq!(written, notes.raw_content());
    }
}
