//! Configuration file and environment overrides.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use fieldsync_fetch::{ClientSettings, CredentialProvider, EnvToken, NoCredentials, StaticToken};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Overrides the configured base URL.
pub const BASE_URL_ENV: &str = "FIELDSYNC_BASE_URL";

/// Supplies the bearer token.
pub const TOKEN_ENV: &str = fieldsync_fetch::auth::TOKEN_ENV_VAR;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Client settings.
    #[serde(default)]
    pub client: ClientSettings,

    /// Bearer token. Prefer the environment variable over storing it here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fieldsync")
            .join("config.json")
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            debug!("Base URL taken from environment");
            self.client.base_url = url;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.token = Some(token);
        }
    }

    /// The credential provider for these settings.
    ///
    /// A configured token wins; otherwise the token is read from the
    /// environment at call time.
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        match &self.token {
            Some(token) if !token.trim().is_empty() => Arc::new(StaticToken::new(token.clone())),
            Some(_) => Arc::new(NoCredentials),
            None => Arc::new(EnvToken::default()),
        }
    }

    /// A copy safe to print.
    pub fn redacted(&self) -> Self {
        Self {
            client: self.client.clone(),
            token: self.token.as_ref().map(|_| "<redacted>".to_string()),
        }
    }
}
