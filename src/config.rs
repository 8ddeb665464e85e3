use crate::github::{DEFAULT_API_URL, DEFAULT_MAX_CONCURRENT_DIFFS};
use crate::log_debug;
use crate::providers::{Model, ProviderEndpoints};
use crate::types::SourceType;

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Directory name under the user's config directory
pub const APP_DIR: &str = "release-scribe";
const CONFIG_FILE: &str = "config.toml";

/// Configuration structure for release-scribe
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct Config {
    /// Model used when `--model` is not given
    #[serde(default)]
    pub default_model: Model,
    /// Source type used when `--source` is not given
    #[serde(default)]
    pub default_source: SourceType,
    /// Whether to enable verbose logging (includes HTTP requests/responses)
    #[serde(default)]
    pub verbose_logging: bool,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub providers: ProviderEndpoints,
    #[serde(default)]
    pub server: ServerConfig,
}

/// How the CLI reaches GitHub and the providers
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// Call GitHub and the providers from this process
    #[default]
    Direct,
    /// Route everything through a release-scribe proxy endpoint
    Proxy,
}

impl GatewayMode {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Proxy => "proxy",
        }
    }
}

impl FromStr for GatewayMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "proxy" => Ok(Self::Proxy),
            other => Err(anyhow!("Unknown gateway mode: {other}. Supported: direct, proxy")),
        }
    }
}

impl fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Repository access settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    pub mode: GatewayMode,
    /// Base URL of the proxy endpoint used in proxy mode
    pub proxy_url: String,
    pub github_api_url: String,
    /// Upper bound on diff requests in flight
    pub max_concurrent_diffs: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: GatewayMode::Direct,
            proxy_url: format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}"),
            github_api_url: DEFAULT_API_URL.to_string(),
            max_concurrent_diffs: DEFAULT_MAX_CONCURRENT_DIFFS,
        }
    }
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;

/// Proxy server bind settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

/// Optional overrides applied by `release-scribe config`
#[derive(Debug, Default, Clone)]
pub struct ConfigUpdate {
    pub mode: Option<GatewayMode>,
    pub proxy_url: Option<String>,
    pub max_concurrent_diffs: Option<usize>,
    pub default_model: Option<Model>,
    pub default_source: Option<SourceType>,
    pub verbose_logging: Option<bool>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.proxy_url.is_none()
            && self.max_concurrent_diffs.is_none()
            && self.default_model.is_none()
            && self.default_source.is_none()
            && self.verbose_logging.is_none()
    }
}

impl Config {
    /// Load the configuration from the user's config directory
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content).with_context(|| {
                format!(
                    "Invalid configuration file format in {}. Please check for syntax errors.",
                    path.display()
                )
            })?
        } else {
            Self::default()
        };

        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Save the configuration to the user's config directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        log_debug!("Configuration saved: {:?}", self);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push(APP_DIR);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Update the configuration with new values
    pub fn update(&mut self, update: ConfigUpdate) {
        if let Some(mode) = update.mode {
            self.gateway.mode = mode;
        }
        if let Some(url) = update.proxy_url {
            self.gateway.proxy_url = url;
        }
        if let Some(width) = update.max_concurrent_diffs {
            self.gateway.max_concurrent_diffs = width.max(1);
        }
        if let Some(model) = update.default_model {
            self.default_model = model;
        }
        if let Some(source) = update.default_source {
            self.default_source = source;
        }
        if let Some(verbose) = update.verbose_logging {
            self.verbose_logging = verbose;
        }

        log_debug!("Configuration updated: {:?}", self);
    }
}
