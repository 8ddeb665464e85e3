//! Error taxonomy for the release-note pipeline.
//!
//! Every failure a submission can hit maps onto one [`ReleaseNotesError`]
//! variant. The variants carry stable wire codes so the proxy server and its
//! clients agree on which kind of failure happened.

/// Remediation shown when a provider rejects the prompt as too long.
pub const TOKEN_LIMIT_GUIDANCE: &str = "The input is too long for the selected model. \
Please select a shorter date range or use commit messages instead of diffs.";

/// Message attached to a 404 from the repository metadata lookup.
pub const REPO_NOT_FOUND_MESSAGE: &str =
    "Repository not found. It might be private and require authentication.";

const FETCH_PREFIX: &str = "GitHub API error: ";
const GENERATION_PREFIX: &str = "Failed to generate release notes: ";

/// Result alias used throughout the pipeline
pub type Result<T> = std::result::Result<T, ReleaseNotesError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReleaseNotesError {
    /// Malformed input caught before any network access
    #[error("{0}")]
    Validation(String),

    /// Repository metadata lookup failed for a reason other than "not found"
    #[error("{0}")]
    VisibilityCheck(String),

    #[error("This is a private repository. Please provide a GitHub access token.")]
    PrivateRepoAuthRequired,

    /// Non-success GitHub response during commit or diff retrieval
    #[error("GitHub API error: {0}")]
    Fetch(String),

    /// The selected model's credential is missing
    #[error("{0}")]
    ProviderConfig(String),

    /// The provider rejected the prompt as too long
    #[error("{0}")]
    TokenLimit(String),

    #[error("Failed to generate release notes: {0}")]
    Generation(String),
}

impl ReleaseNotesError {
    /// Token-limit error carrying the standard remediation text
    pub fn token_limit() -> Self {
        Self::TokenLimit(TOKEN_LIMIT_GUIDANCE.to_string())
    }

    /// Stable identifier used in proxy error bodies
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::VisibilityCheck(_) => "visibility_check",
            Self::PrivateRepoAuthRequired => "private_repo_auth_required",
            Self::Fetch(_) => "fetch",
            Self::ProviderConfig(_) => "provider_config",
            Self::TokenLimit(_) => "token_limit",
            Self::Generation(_) => "generation",
        }
    }

    /// The message without the variant's display prefix.
    ///
    /// `from_code(e.code(), e.detail())` rebuilds an equal error.
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::VisibilityCheck(msg)
            | Self::Fetch(msg)
            | Self::ProviderConfig(msg)
            | Self::TokenLimit(msg)
            | Self::Generation(msg) => msg.clone(),
            Self::PrivateRepoAuthRequired => self.to_string(),
        }
    }

    /// Rebuild an error from a proxy error body.
    ///
    /// `message` may be either the detail or the full display text.
    /// Unknown codes fall back to [`ReleaseNotesError::Generation`].
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let strip = |prefix: &str| {
            message
                .strip_prefix(prefix)
                .map_or_else(|| message.clone(), str::to_string)
        };

        match code {
            "validation" => Self::Validation(message),
            "visibility_check" => Self::VisibilityCheck(message),
            "private_repo_auth_required" => Self::PrivateRepoAuthRequired,
            "fetch" => Self::Fetch(strip(FETCH_PREFIX)),
            "provider_config" => Self::ProviderConfig(message),
            "token_limit" if message.is_empty() => Self::token_limit(),
            "token_limit" => Self::TokenLimit(message),
            _ => Self::Generation(strip(GENERATION_PREFIX)),
        }
    }

    pub fn is_token_limit(&self) -> bool {
        matches!(self, Self::TokenLimit(_))
    }
}
