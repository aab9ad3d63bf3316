//! Configuration management for the backoffice client.
//!
//! Loads configuration from ${CAMPUS_ADMIN_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for configuration and session data.
    //!
    //! CAMPUS_ADMIN_HOME resolution order:
    //! 1. CAMPUS_ADMIN_HOME environment variable (if set)
    //! 2. ~/.config/campus-admin (default)

    use std::path::PathBuf;

    /// Environment variable overriding the home directory.
    pub const HOME_ENV: &str = "CAMPUS_ADMIN_HOME";

    /// Returns the backoffice home directory.
    ///
    /// Checks `CAMPUS_ADMIN_HOME` first, falls back to ~/.config/campus-admin.
    /// When no home directory can be determined the current directory is used.
    pub fn admin_home() -> PathBuf {
        if let Ok(home) = std::env::var(HOME_ENV)
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".campus-admin"),
            |h| h.join(".config").join("campus-admin"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        admin_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        admin_home().join("session.json")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        admin_home().join("logs")
    }
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: Option<String>,
    /// Request timeout in seconds (0 disables).
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: Config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Endpoint used to re-validate the stored token on every guarded command.
    ///
    /// When unset the locally stored session is trusted.
    pub validation_path: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "https://class-connect-main-6b7ca6f.d2.zuplo.dev";
    /// Environment variable overriding the base URL.
    pub const BASE_URL_ENV: &str = "CAMPUS_ADMIN_API_URL";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, DEFAULT_CONFIG_TEMPLATE)
    }

    /// Resolves the base URL with precedence: override > config > default.
    ///
    /// The override is the `--api-url` flag or `CAMPUS_ADMIN_API_URL`.
    pub fn resolve_base_url(&self, override_url: Option<&str>) -> Result<url::Url> {
        let candidate = [override_url, self.api.base_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(Self::DEFAULT_BASE_URL);

        url::Url::parse(candidate).with_context(|| format!("Invalid API base URL: {candidate}"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.api.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.api.timeout_secs))
        }
    }

    /// Returns the remote validation path, ignoring blank values.
    pub fn validation_path(&self) -> Option<&str> {
        self.auth
            .validation_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# campus-admin configuration

[api]
# Backend base URL (CAMPUS_ADMIN_API_URL and --api-url take precedence)
# base_url = "https://class-connect-main-6b7ca6f.d2.zuplo.dev"
# Request timeout in seconds (0 disables)
timeout_secs = 30

[auth]
# Re-validate the stored token remotely before every protected command.
# validation_path = "/auth/validate"
"#;
