//! Repository locator
//!
//! Turns the free-form repository string a user types into an owner/name pair.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use url::Url;

static GITHUB_PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/]+)").expect("repository pattern should compile")
});

/// A GitHub repository identified by owner and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    /// Build a reference, rejecting empty segments and stripping a `.git` suffix
    pub fn new(owner: &str, name: &str) -> Option<Self> {
        let owner = owner.trim();
        let name = name.trim();
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parse a repository URL into a [`RepositoryReference`].
///
/// Accepts `https://github.com/{owner}/{repo}` with an optional `.git`
/// suffix and extra path segments, and falls back to a
/// `github.com/{owner}/{repo}` match for strings without a scheme.
pub fn parse(input: &str) -> Option<RepositoryReference> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(input)
        && is_github_host(&url)
    {
        return from_url(&url);
    }

    let captures = GITHUB_PATH_PATTERN.captures(input)?;
    let owner = captures.get(1)?.as_str();
    let name = strip_query_and_fragment(captures.get(2)?.as_str());
    RepositoryReference::new(owner, name)
}

fn is_github_host(url: &Url) -> bool {
    matches!(url.host_str(), Some("github.com" | "www.github.com"))
}

fn from_url(url: &Url) -> Option<RepositoryReference> {
    let mut segments = url.path_segments()?;
    let owner = segments.next()?;
    let name = segments.next()?;
    RepositoryReference::new(owner, name)
}

fn strip_query_and_fragment(segment: &str) -> &str {
    segment
        .split(['?', '#'])
        .next()
        .unwrap_or(segment)
}
