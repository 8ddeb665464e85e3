//! Credentials for GitHub and the LLM providers
//!
//! Credentials are always passed explicitly into gateway and dispatcher calls.
//! The CLI layers them from flags, the environment and a small TOML store;
//! the proxy server layers its own environment over request bodies.

use crate::log_debug;
use crate::providers::Model;
use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The fixed credential names, shared by the environment and the store file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    GithubToken,
    OpenAiApiKey,
    AnthropicApiKey,
}

impl CredentialKey {
    pub const ALL: &'static [CredentialKey] = &[
        CredentialKey::GithubToken,
        CredentialKey::OpenAiApiKey,
        CredentialKey::AnthropicApiKey,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::GithubToken => "GITHUB_TOKEN",
            Self::OpenAiApiKey => "OPENAI_API_KEY",
            Self::AnthropicApiKey => "ANTHROPIC_API_KEY",
        }
    }

    /// The key a model needs to generate notes
    pub const fn for_model(model: Model) -> Self {
        match model {
            Model::Gpt4oMini => Self::OpenAiApiKey,
            Model::Claude => Self::AnthropicApiKey,
        }
    }
}

impl FromStr for CredentialKey {
    type Err = CredentialKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase().replace('-', "_");
        Self::ALL
            .iter()
            .find(|key| key.name() == upper)
            .copied()
            .ok_or_else(|| CredentialKeyError(s.to_string()))
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown credential: {0}. Supported: GITHUB_TOKEN, OPENAI_API_KEY, ANTHROPIC_API_KEY")]
pub struct CredentialKeyError(String);

/// Optional secrets for one submission. Blank values count as absent.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    #[serde(rename = "GITHUB_TOKEN", default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    #[serde(rename = "OPENAI_API_KEY", default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(rename = "ANTHROPIC_API_KEY", default, skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl Credentials {
    /// Read all credentials from the process environment
    pub fn from_env() -> Self {
        let read = |key: CredentialKey| {
            std::env::var(key.name())
                .ok()
                .filter(|v| !v.trim().is_empty())
        };

        Self {
            github_token: read(CredentialKey::GithubToken),
            openai_api_key: read(CredentialKey::OpenAiApiKey),
            anthropic_api_key: read(CredentialKey::AnthropicApiKey),
        }
    }

    pub fn get(&self, key: CredentialKey) -> Option<&str> {
        non_blank(match key {
            CredentialKey::GithubToken => self.github_token.as_ref(),
            CredentialKey::OpenAiApiKey => self.openai_api_key.as_ref(),
            CredentialKey::AnthropicApiKey => self.anthropic_api_key.as_ref(),
        })
    }

    pub fn set(&mut self, key: CredentialKey, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        match key {
            CredentialKey::GithubToken => self.github_token = value,
            CredentialKey::OpenAiApiKey => self.openai_api_key = value,
            CredentialKey::AnthropicApiKey => self.anthropic_api_key = value,
        }
    }

    pub fn github_token(&self) -> Option<&str> {
        self.get(CredentialKey::GithubToken)
    }

    /// API key required by `model`, if present
    pub fn api_key_for(&self, model: Model) -> Option<&str> {
        self.get(CredentialKey::for_model(model))
    }

    /// Field-by-field layering: values present in `self` win over `fallback`
    #[must_use]
    pub fn prefer(self, fallback: Self) -> Self {
        let mut merged = Self::default();
        for &key in CredentialKey::ALL {
            let value = self.get(key).or_else(|| fallback.get(key));
            merged.set(key, value.map(str::to_string));
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        CredentialKey::ALL.iter().all(|key| self.get(*key).is_none())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key| self.get(key).map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("github_token", &redact(CredentialKey::GithubToken))
            .field("openai_api_key", &redact(CredentialKey::OpenAiApiKey))
            .field("anthropic_api_key", &redact(CredentialKey::AnthropicApiKey))
            .finish()
    }
}

/// Mask a secret for display, keeping only its edges
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// TOML-backed credential storage
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub const FILE_NAME: &'static str = "credentials.toml";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's config directory
    pub fn default_location() -> Result<Self> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push(crate::config::APP_DIR);
        path.push(Self::FILE_NAME);
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored credentials; a missing file yields empty credentials
    pub fn load(&self) -> Result<Credentials> {
        if !self.path.exists() {
            return Ok(Credentials::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let credentials: Credentials = toml::from_str(&content)
            .with_context(|| format!("Invalid credentials file {}", self.path.display()))?;

        // Normalize blanks away
        Ok(credentials.prefer(Credentials::default()))
    }

    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let normalized = credentials.clone().prefer(Credentials::default());
        let content = toml::to_string(&normalized)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        restrict_permissions(&self.path)?;

        log_debug!("Credentials saved to {}", self.path.display());
        Ok(())
    }

    pub fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        let mut credentials = self.load()?;
        credentials.set(key, Some(value.to_string()));
        self.save(&credentials)
    }

    pub fn clear(&self, key: CredentialKey) -> Result<()> {
        let mut credentials = self.load()?;
        credentials.set(key, None);
        self.save(&credentials)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
