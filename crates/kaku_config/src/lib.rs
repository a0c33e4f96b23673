//! Configuration management for the Kakuyomu MCP server
//!
//! Loads `kakuyomu-mcp.toml` and applies environment overrides
//! (`HOST`, `PORT`, `KAKUYOMU_BASE_URL`).

use kaku_common::{KakuError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the current directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "kakuyomu-mcp.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the configuration was read from, if anywhere
    #[serde(skip)]
    pub source: Option<PathBuf>,

    /// HTTP transport listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound requests to the site
    #[serde(default)]
    pub http: HttpConfig,

    /// MCP tool settings
    #[serde(default)]
    pub mcp: McpConfig,
}

/// Server configuration ([server])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP sessions idle this long are dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    9468
}
fn default_session_idle_secs() -> u64 {
    1800
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl ServerConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

/// HTTP client configuration ([http])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://kakuyomu.jp".to_string()
}
fn default_user_agent() -> String {
    format!("kakuyomu-mcp/{}", env!("CARGO_PKG_VERSION"))
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// MCP configuration ([mcp])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Default `limit` for work listings and rankings
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Default `limit` for episode listings
    #[serde(default = "default_episode_limit")]
    pub episode_limit: usize,

    /// Site requests allowed per tool per minute
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: usize,
}

fn default_limit() -> usize {
    10
}
fn default_episode_limit() -> usize {
    20
}
fn default_rate_limit() -> usize {
    30
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            episode_limit: default_episode_limit(),
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, `kakuyomu-mcp.toml` in the
    /// current directory is used when present, otherwise defaults. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(KakuError::ConfigError(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        };

        let mut config = match config_path {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML file without applying environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KakuError::ConfigError(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_toml(&content)?;
        config.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| KakuError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `HOST`, `PORT` and `KAKUYOMU_BASE_URL` overrides
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|h| !h.is_empty()) {
            self.server.host = host;
        }

        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            self.server.port = port
                .parse()
                .map_err(|_| KakuError::ConfigError(format!("Invalid PORT: {}", port)))?;
        }

        if let Some(base_url) = lookup("KAKUYOMU_BASE_URL").filter(|u| !u.is_empty()) {
            self.http.base_url = base_url;
        }

        self.validate()
    }

    /// Socket address string for the HTTP transport
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn validate(&self) -> Result<()> {
        if !(self.http.base_url.starts_with("http://") || self.http.base_url.starts_with("https://"))
        {
            return Err(KakuError::ConfigError(format!(
                "http.base_url must start with http:// or https://: {}",
                self.http.base_url
            )));
        }
        if self.server.session_idle_secs == 0 {
            return Err(KakuError::ConfigError(
                "server.session_idle_secs must be greater than 0".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(KakuError::ConfigError(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.mcp.rate_limit_per_minute == 0 {
            return Err(KakuError::ConfigError(
                "mcp.rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
