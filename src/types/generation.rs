//! Generation request types

use super::commit::NoteItem;
use crate::providers::Model;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which commit data feeds the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Commit messages only
    #[default]
    Commits,
    /// Commit messages plus their unified diffs
    Diffs,
}

impl SourceType {
    pub const ALL: &'static [SourceType] = &[SourceType::Commits, SourceType::Diffs];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Commits => "commits",
            Self::Diffs => "diffs",
        }
    }
}

impl FromStr for SourceType {
    type Err = ParseSourceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|source| source.name() == lower)
            .copied()
            .ok_or_else(|| ParseSourceTypeError(s.to_string()))
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown source type: {0}. Supported: commits, diffs")]
pub struct ParseSourceTypeError(String);

/// Everything the dispatcher needs for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub source_type: SourceType,
    pub model: Model,
    pub items: Vec<NoteItem>,
}

impl GenerationRequest {
    pub fn new(source_type: SourceType, model: Model, items: Vec<NoteItem>) -> Self {
        Self {
            source_type,
            model,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_from_str() {
        assert_eq!("commits".parse::<SourceType>().ok(), Some(SourceType::Commits));
        assert_eq!("DIFFS".parse::<SourceType>().ok(), Some(SourceType::Diffs));
        assert!("patches".parse::<SourceType>().is_err());
    }

    #[test]
    fn test_source_type_serde_uses_lowercase() {
        let json = serde_json::to_string(&SourceType::Diffs).expect("serializes");
        assert_eq!(json, "\"diffs\"");
        let parsed: SourceType = serde_json::from_str("\"commits\"").expect("deserializes");
        assert_eq!(parsed, SourceType::Commits);
    }
}
