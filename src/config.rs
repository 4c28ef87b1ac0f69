use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const CONFIG_FILE: &str = ".release-labeler.toml";
const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings read from .release-labeler.toml; the bot runs with zero config
/// inside GitHub Actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    pub token: Option<String>,

    /// REST API root, for GitHub Enterprise installs.
    pub api_url: Option<String>,
}

impl Config {
    /// Read .release-labeler.toml from the current directory, or defaults.
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_or_default(Path::new(CONFIG_FILE))
    }

    /// A missing file is not an error: every setting has a usable default.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Token from the config file, else `GITHUB_TOKEN` (what Actions injects).
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
    }

    pub fn api_url(&self) -> &str {
        self.github
            .api_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_API_URL)
    }
}
